//! Ground-truth labels derived from fingerprint file names
//!
//! Genre corpora name files `<genre>.<n>.freqs` or `<genre>_<n>.freqs`.
//! Noisy queries are named `<song>_<noise type>_intensity_<level>.freqs`.

pub const UNKNOWN: &str = "unknown";

const INTENSITY_MARKER: &str = "_intensity_";

/// Noise applied to a query, as encoded in its file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseLabel {
    pub noise_type: String,
    pub intensity: String,
}

impl NoiseLabel {
    fn unknown() -> Self {
        Self {
            noise_type: UNKNOWN.to_string(),
            intensity: UNKNOWN.to_string(),
        }
    }
}

/// Genre a file belongs to: everything before the first `.` or `_`
pub fn expected_genre(file_name: &str) -> &str {
    let end = file_name
        .find(|c: char| c == '.' || c == '_')
        .unwrap_or(file_name.len());
    if end == 0 {
        UNKNOWN
    } else {
        &file_name[..end]
    }
}

/// Noise type and intensity, or `unknown` for both when the name does not
/// follow the noisy query convention
pub fn noise_label(file_name: &str, extension: &str) -> NoiseLabel {
    let (Some(first), Some(marker)) = (file_name.find('_'), file_name.find(INTENSITY_MARKER)) else {
        return NoiseLabel::unknown();
    };

    let noise_type = &file_name[(first + 1).min(marker)..marker];
    let intensity = &file_name[marker + INTENSITY_MARKER.len()..];
    let extension = extension.trim_start_matches('.');
    let intensity = intensity
        .strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(intensity);

    let or_unknown = |s: &str| {
        if s.is_empty() {
            UNKNOWN.to_string()
        } else {
            s.to_string()
        }
    };

    NoiseLabel {
        noise_type: or_unknown(noise_type),
        intensity: or_unknown(intensity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_genre() {
        assert_eq!(expected_genre("jazz.00042.freqs"), "jazz");
        assert_eq!(expected_genre("hiphop_7.freqs"), "hiphop");
        assert_eq!(expected_genre("rock"), "rock");
        assert_eq!(expected_genre(".hidden"), UNKNOWN);
        assert_eq!(expected_genre(""), UNKNOWN);
    }

    #[test]
    fn test_noise_label() {
        let label = noise_label("track01_white_intensity_0.5.freqs", "freqs");
        assert_eq!(label.noise_type, "white");
        assert_eq!(label.intensity, "0.5");

        let label = noise_label("track01_pink_brown_intensity_high.freqs", ".freqs");
        assert_eq!(label.noise_type, "pink_brown");
        assert_eq!(label.intensity, "high");
    }

    #[test]
    fn test_noise_label_keeps_foreign_extension() {
        let label = noise_label("a_babble_intensity_3.bin", "freqs");
        assert_eq!(label.intensity, "3.bin");
    }

    #[test]
    fn test_noise_label_unknown() {
        assert_eq!(noise_label("track01.freqs", "freqs"), NoiseLabel::unknown());
        assert_eq!(noise_label("track01_white.freqs", "freqs"), NoiseLabel::unknown());

        // marker directly after the first underscore
        let label = noise_label("track_intensity_2.freqs", "freqs");
        assert_eq!(label.noise_type, UNKNOWN);
        assert_eq!(label.intensity, "2");
    }
}
