// Command-line surface for mirrorprobe
// Uses clap's builder API; values are handed to config as ScanOptions.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::config::{ScanOptions, DEFAULT_REPORT_PATH};

pub fn build_cli() -> Command {
    Command::new("mirrorprobe")
        .version(clap::crate_version!())
        .author("Jake Abendroth")
        .about("Probe a live web server for exposed backup, lock and config files mirrored from a local source tree")
        .after_help("EXAMPLES:\n  mirrorprobe -s ./wordpress -u https://example.com/\n  mirrorprobe -s ./app -u http://10.0.0.5/app/ -m GET --skip-size 0,120-130 --skip-content 'Not Found'\n  mirrorprobe -s ./site -u https://example.com/ --mutations '.bak,~,.*.swp' -H 'X-Api-Key: k1; Accept=*/*'")
        .arg(Arg::new("src")
            .short('s')
            .long("src")
            .required(true)
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("Source path of directory"))
        .arg(Arg::new("url")
            .short('u')
            .long("url")
            .required(true)
            .num_args(1)
            .help("URL endpoint to hit; candidate paths are appended verbatim"))
        .arg(Arg::new("method")
            .short('m')
            .long("method")
            .num_args(1)
            .default_value("HEAD")
            .help("HTTP method to use"))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .num_args(1)
            .default_value(DEFAULT_REPORT_PATH)
            .help("Append report to this file (default gets the target host appended)"))
        .arg(Arg::new("no_report")
            .long("no-report")
            .action(ArgAction::SetTrue)
            .help("Do not write a report file"))
        .arg(Arg::new("depth")
            .long("depth")
            .num_args(1)
            .default_value("0")
            .value_parser(value_parser!(usize))
            .help("How deep to go in folders; 0 means no limit"))
        .arg(Arg::new("delay")
            .short('z')
            .long("delay")
            .num_args(1)
            .default_value("150")
            .value_parser(value_parser!(u64))
            .help("Delay every request for N milliseconds"))
        .arg(Arg::new("timeout")
            .long("timeout")
            .num_args(1)
            .default_value("10")
            .value_parser(value_parser!(u64))
            .help("Timeout (seconds) to wait for a response"))
        .arg(Arg::new("mutations")
            .long("mutations")
            .num_args(1)
            .action(ArgAction::Append)
            .help("Mutations of checked file; '*' stands for the filename, otherwise a suffix [default: ~,.swp,.swo,.tmp,.dmp,.bkp,.backup,.bak,.zip,.tar,.old,_*,~*]"))
        .arg(Arg::new("skip")
            .long("skip")
            .num_args(1)
            .action(ArgAction::Append)
            .help("Skip files and directories with these names [default: jquery,css,img,images,i18n,po]"))
        .arg(Arg::new("skip_ext")
            .long("skip-ext")
            .num_args(1)
            .action(ArgAction::Append)
            .help("Skip files with these extensions [default: .png,.jpeg,jpg,Gif,.CSS,.less,.sass]"))
        .arg(Arg::new("skip_code")
            .long("skip-code")
            .num_args(1)
            .action(ArgAction::Append)
            .help("Skip responses with this HTTP status code [default: 404]"))
        .arg(Arg::new("skip_size")
            .long("skip-size")
            .num_args(1)
            .action(ArgAction::Append)
            .help("Skip responses with this body size; ranges like 100-200 allowed"))
        .arg(Arg::new("skip_content")
            .long("skip-content")
            .num_args(1)
            .help("Skip responses whose body contains this text"))
        .arg(Arg::new("dir_only")
            .long("dir-only")
            .action(ArgAction::SetTrue)
            .help("Scan directories only"))
        .arg(Arg::new("user_agent")
            .long("user-agent")
            .num_args(1)
            .default_value("random")
            .help("User-Agent sent with requests; 'random' picks one"))
        .arg(Arg::new("cookie")
            .short('C')
            .long("cookie")
            .num_args(1)
            .help("Cookie string sent with requests"))
        .arg(Arg::new("headers")
            .short('H')
            .long("headers")
            .num_args(1)
            .help("Custom headers, 'k1:v1; k2=v2' or newline separated"))
}

/// Collect parsed arguments into raw scan options.
pub fn options_from_matches(matches: &ArgMatches) -> ScanOptions {
    let defaults = ScanOptions::default();
    let string = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();
    // list flags left out fall back to the built-in lists
    let list = |id: &str, fallback: &[String]| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_else(|| fallback.to_vec())
    };

    let report = if matches.get_flag("no_report") {
        None
    } else {
        matches.get_one::<String>("output").cloned()
    };

    ScanOptions {
        source: matches.get_one::<PathBuf>("src").cloned().unwrap_or_default(),
        endpoint: string("url"),
        method: string("method"),
        depth: matches.get_one::<usize>("depth").copied().unwrap_or(0),
        delay_ms: matches.get_one::<u64>("delay").copied().unwrap_or(0),
        timeout_secs: matches.get_one::<u64>("timeout").copied().unwrap_or(0),
        skip: list("skip", &defaults.skip),
        skip_ext: list("skip_ext", &defaults.skip_ext),
        skip_code: list("skip_code", &defaults.skip_code),
        skip_size: list("skip_size", &defaults.skip_size),
        skip_content: string("skip_content"),
        dir_only: matches.get_flag("dir_only"),
        user_agent: string("user_agent"),
        cookie: string("cookie"),
        headers: string("headers"),
        mutations: list("mutations", &defaults.mutations),
        report,
    }
}
