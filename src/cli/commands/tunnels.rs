use crate::features::tunnels::services::PRESETS;
use clap::{builder::PossibleValuesParser, Arg, ArgAction, ArgGroup, Command};
use uuid::Uuid;

fn id() -> Arg {
    Arg::new("id")
        .help("Tunnel id")
        .required(true)
        .value_parser(clap::value_parser!(Uuid))
}

pub fn subcommand() -> Command {
    let services: Vec<&'static str> = PRESETS.iter().map(|preset| preset.service_type).collect();

    Command::new("tunnels")
        .about("Manage your tunnels")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List tunnels with their connection status"))
        .subcommand(
            Command::new("check")
                .about("Check whether a subdomain is available")
                .arg(Arg::new("subdomain").required(true)),
        )
        .subcommand(
            Command::new("create")
                .about("Create a tunnel")
                .arg(Arg::new("subdomain").required(true))
                .arg(
                    Arg::new("service")
                        .short('s')
                        .long("service")
                        .help("Service preset, sets the default port")
                        .default_value("homeassistant")
                        .value_parser(PossibleValuesParser::new(services)),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Target port, required for the custom service")
                        .value_parser(clap::value_parser!(u16).range(1..)),
                ),
        )
        .subcommand(
            Command::new("toggle")
                .about("Enable or disable a tunnel")
                .arg(id()),
        )
        .subcommand(
            Command::new("routing")
                .about("Route traffic to the device IP or the VPN IP")
                .arg(id())
                .arg(
                    Arg::new("device")
                        .long("device")
                        .help("Forward to the device's LAN IP")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("vpn")
                        .long("vpn")
                        .help("Forward to the WireGuard peer IP")
                        .action(ArgAction::SetTrue),
                )
                .group(
                    ArgGroup::new("target")
                        .args(["device", "vpn"])
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a tunnel")
                .arg(id()),
        )
        .subcommand(
            Command::new("config")
                .about("Download the WireGuard configuration")
                .arg(id())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Destination file (default: homevpn-<subdomain>.conf)"),
                ),
        )
        .subcommand(Command::new("watch").about("Live dashboard, refreshed every 5 seconds"))
}
