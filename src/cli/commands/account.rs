use clap::{Arg, Command};

fn email() -> Arg {
    Arg::new("email")
        .help("Account email address")
        .required(true)
}

pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new("register")
            .about("Create an account; a code and password are sent by email")
            .arg(email()),
        Command::new("verify")
            .about("Confirm the email address with the 6-digit code")
            .arg(email())
            .arg(
                Arg::new("code")
                    .help("Verification code, pasted text is accepted")
                    .required(true),
            ),
        Command::new("resend-code")
            .about("Send a new verification code")
            .arg(email()),
        Command::new("login")
            .about("Sign in and store the session token")
            .arg(email())
            .arg(
                Arg::new("password")
                    .long("password")
                    .help("Account password")
                    .env("HOMEACCESS_PASSWORD")
                    .hide_env_values(true)
                    .required(true),
            ),
        Command::new("forgot-password")
            .about("Email a new password")
            .arg(email()),
        Command::new("logout").about("Forget the stored session token"),
        Command::new("whoami").about("Show the signed-in account and its quota"),
    ]
}
