use crate::models::{ExceptionRule, MediaTypeConfig};
use camino::{Utf8Path, Utf8PathBuf};

/// Override path of the first rule whose prefix matches `file_name`.
///
/// Rules are checked in declaration order. No match yields an empty string.
pub fn find_override<'a>(file_name: &str, exceptions: &'a [ExceptionRule]) -> &'a str {
    exceptions
        .iter()
        .find(|rule| rule.matches(file_name))
        .map_or("", |rule| rule.override_path.as_str())
}

/// Append a configured sub-path below `base`.
///
/// Override paths are written by hand in the settings files, with either `/` or
/// `\` as separator and usually a leading separator (`\Anime\OnePiece`). They are
/// split into components so the result uses the platform separator and always
/// stays below `base`; `.` and `..` components are dropped.
pub fn join_sub_path(base: &Utf8Path, sub_path: &str) -> Utf8PathBuf {
    sub_path
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .fold(base.to_path_buf(), |path, part| path.join(part))
}

/// Final destination of `file_name` under `completion_root`.
///
/// `completion_root / <first matching override> / file_name`
pub fn resolve(
    file_name: &str,
    exceptions: &[ExceptionRule],
    completion_root: &Utf8Path,
) -> Utf8PathBuf {
    let override_path = find_override(file_name, exceptions);
    join_sub_path(completion_root, override_path).join(file_name)
}

/// Destination including the optional series and season folders.
///
/// The series folder is only added when no exception rule matched, since an
/// override already names the target folder. The season folder is added whenever
/// it is enabled and a season was parsed from the name.
pub fn resolve_layout(
    file_name: &str,
    series_name: Option<&str>,
    season: Option<u32>,
    config: &MediaTypeConfig,
) -> Utf8PathBuf {
    let override_path = find_override(file_name, &config.exceptions);
    let mut folder = join_sub_path(&config.completion_path, override_path);

    if config.use_series_folder && override_path.is_empty() {
        if let Some(series) = series_name.map(sanitize_folder_name).filter(|s| !s.is_empty()) {
            folder.push(series);
        }
    }

    if config.use_season_folder {
        if let Some(season) = season {
            folder.push(format!("Season {:02}", season));
        }
    }

    folder.join(file_name)
}

/// Strip characters that are not allowed in folder names on Windows
fn sanitize_folder_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect::<String>()
        .trim()
        .trim_end_matches('.')
        .to_string()
}
