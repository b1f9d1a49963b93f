use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("wikifeat")
        .version(env!("CARGO_PKG_VERSION"))
        .author("wikifeat contributors")
        .about("Republish a wiki's featured article to Telegram channels when it changes")
        .arg(
            clap::arg!(--channel <ID> "Destination channel (repeatable)")
                .value_name("ID")
                .action(clap::ArgAction::Append),
        )
        .arg(
            clap::arg!(--rules_url <URL> "Where the \"text license\" link points")
                .long("rules-url")
                .value_name("URL"),
        )
        .arg(clap::arg!(--source <URL> "Wiki page holding the featured article").value_name("URL"))
        .arg(
            clap::arg!(--checkpoint <FILE> "File remembering the last published title")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--no_image "Publish text only, without resolving an image").long("no-image"))
        .arg(clap::arg!(--token <TOKEN> "Telegram bot token").value_name("TOKEN"))
        .arg(
            clap::arg!(--lang <LANG> "Caption and console language")
                .default_value("ru")
                .value_parser(["ru", "en"]),
        )
        .arg(clap::arg!(--dry_run "Print the caption instead of publishing it").long("dry-run"))
        .arg(clap::arg!(--json "With --dry-run, print the located article as JSON"))
        .arg(
            clap::arg!(--html <FILE> "Read the source page from a saved HTML snapshot")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(
            clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests")
                .long("user-agent")
                .value_name("UA"),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "wikifeat", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "wikifeat", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "wikifeat", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "wikifeat", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
