use clap::{Arg, ArgAction, Command, ValueHint, command};

pub fn build_command() -> Command {
    command!()
        .subcommand_required(true)
        .arg(
            Arg::new("install_dir")
                .short('d')
                .long("install-dir")
                .global(true)
                .required(false)
                .value_hint(ValueHint::DirPath)
                .value_name("PATH")
                .help("Games root, overriding the configured one."),
        )
        .subcommands([
            Command::new("list").about("List installed games."),
            Command::new("info")
                .about("Show version, DLCs and launcher of an installed game.")
                .arg(game_arg()),
            Command::new("launch")
                .about("Launch an installed game and wait for it to exit.")
                .args([
                    game_arg(),
                    Arg::new("wine")
                        .long("wine")
                        .required(false)
                        .value_name("COMMAND")
                        .help("Wine binary for Windows games."),
                ]),
            Command::new("dlc")
                .about("Show the status of one DLC.")
                .args([
                    game_arg(),
                    Arg::new("title").required(true).help("DLC title."),
                    Arg::new("remote_version")
                        .long("remote-version")
                        .alias("remote")
                        .required(false)
                        .value_name("VERSION")
                        .help("Latest version offered by the store."),
                ]),
            Command::new("config")
                .about("Show or update the saved configuration.")
                .args([
                    Arg::new("set_install_dir")
                        .long("set-install-dir")
                        .required(false)
                        .value_hint(ValueHint::DirPath)
                        .value_name("PATH")
                        .help("Store a new games root."),
                    Arg::new("set_wine")
                        .long("set-wine")
                        .required(false)
                        .value_name("COMMAND")
                        .help("Store a new Wine binary."),
                    Arg::new("show")
                        .long("show")
                        .action(ArgAction::SetTrue)
                        .help("Print the configuration file path and values."),
                ]),
        ])
}

fn game_arg() -> Arg {
    Arg::new("game")
        .required(true)
        .value_name("NAME")
        .help("Game name; a partial name matches too.")
}
