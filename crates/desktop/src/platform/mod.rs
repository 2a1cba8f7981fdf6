use std::path::Path;
use std::process::Command;

/// Whether the desktop is in dark mode. Unknown platforms count as dark,
/// matching the recorder's black preview area.
pub fn is_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(target_os = "windows")]
    {
        // AppsUseLightTheme: 0x0 = dark, 0x1 = light
        Command::new("reg")
            .args([
                "query",
                r"HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize",
                "/v",
                "AppsUseLightTheme",
            ])
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).contains("0x0"))
            .unwrap_or(true)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "color-scheme"])
            .output()
            .map(|o| !String::from_utf8_lossy(&o.stdout).contains("light"))
            .unwrap_or(true)
    }
}

/// Shows a saved recording in the system file manager, selecting it where
/// the platform supports that.
pub fn reveal_in_file_manager(path: &Path) {
    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg("-R").arg(path).spawn().map(|_| ())
    } else if cfg!(target_os = "windows") {
        Command::new("explorer")
            .arg(format!("/select,{}", path.display()))
            .spawn()
            .map(|_| ())
    } else {
        let dir = path.parent().unwrap_or(path);
        open::that(dir)
    };

    if let Err(e) = result {
        log::warn!("Could not reveal {}: {e}", path.display());
    }
}
