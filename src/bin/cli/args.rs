//! Translation of `/x` style switches into long options.
//!
//! The tool accepts Windows-style switches (`/t`, `/e:*.tmp;*.bak`) next to
//! the usual `--test`, `--exclude`. Switches are rewritten before clap sees
//! them; anything that is not a known switch passes through unchanged, so a
//! Unix path such as `/tmp` is left alone.

use std::ffi::OsString;

/// Rewrites the arguments after the program name.
pub fn translate_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut translated: Vec<OsString> = args.next().into_iter().collect();
    for arg in args {
        match arg.to_str().and_then(translate_switch) {
            Some(option) => translated.push(option.into()),
            None => translated.push(arg),
        }
    }
    translated
}

fn translate_switch(arg: &str) -> Option<String> {
    if matches!(arg, "/?" | "?") || arg.eq_ignore_ascii_case("/help") {
        return Some("--help".to_string());
    }
    let switch = arg.strip_prefix('/')?;
    let (name, value) = match switch.split_once(':') {
        Some((name, value)) => (name, Some(value)),
        None => (switch, None),
    };
    let option = match (name.to_ascii_lowercase().as_str(), value) {
        ("t" | "l", None) => "--test",
        ("o", None) => "--overwrite",
        ("b", Some(_)) => "--block-size",
        ("p", Some(_)) => "--password",
        ("e", Some(_)) => "--exclude",
        ("f", Some(_)) => "--stream-separator",
        _ => return None,
    };
    Some(match value {
        Some(value) => format!("{option}={value}"),
        None => option.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(args: &[&str]) -> Vec<String> {
        translate_args(args.iter().map(OsString::from))
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_switches() {
        assert_eq!(
            translate(&["prog", "tar", "/t", "/b:10M", "/E:*.tmp;*.bak", "out"]),
            ["prog", "tar", "--test", "--block-size=10M", "--exclude=*.tmp;*.bak", "out"]
        );
        assert_eq!(
            translate(&["prog", "untar", "/l", "/o", "/f:_", "/p:secret", "a.star"]),
            [
                "prog",
                "untar",
                "--test",
                "--overwrite",
                "--stream-separator=_",
                "--password=secret",
                "a.star"
            ]
        );
    }

    #[test]
    fn test_help_forms() {
        for help in ["/?", "?", "/help", "/HELP"] {
            assert_eq!(translate(&["prog", help]), ["prog", "--help"]);
        }
    }

    #[test]
    fn test_paths_pass_through() {
        assert_eq!(
            translate(&["prog", "dir", "/tmp", "/t:x", "/b"]),
            ["prog", "dir", "/tmp", "/t:x", "/b"]
        );
    }

    #[test]
    fn test_program_name_untouched() {
        assert_eq!(translate(&["/?"]), ["/?"]);
    }
}
