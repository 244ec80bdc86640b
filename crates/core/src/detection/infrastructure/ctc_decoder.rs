use std::fs;
use std::path::Path;

/// Greedy CTC decoder over a recognition model's per-timestep class scores.
///
/// Class 0 is the CTC blank, classes `1..=n` map to the dictionary lines and
/// the last class is a space.
pub struct CtcDecoder {
    charset: Vec<String>,
}

impl CtcDecoder {
    pub fn new(dictionary: Vec<String>) -> Self {
        let mut charset = Vec::with_capacity(dictionary.len() + 2);
        charset.push(String::new());
        charset.extend(dictionary);
        charset.push(" ".to_string());
        Self { charset }
    }

    /// Reads a one-entry-per-line dictionary file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let contents = fs::read_to_string(path)?;
        let entries = contents
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        Ok(Self::new(entries))
    }

    pub fn num_classes(&self) -> usize {
        self.charset.len()
    }

    /// Decodes a `timesteps × classes` row-major score matrix.
    ///
    /// Returns the text and the mean top score of the emitted characters
    /// (0.0 when nothing was emitted).
    pub fn decode(&self, scores: &[f32], timesteps: usize, classes: usize) -> (String, f32) {
        let mut text = String::new();
        let mut confidence_sum = 0.0f32;
        let mut emitted = 0usize;
        let mut previous = 0usize;

        for t in 0..timesteps {
            let row = match scores.get(t * classes..(t + 1) * classes) {
                Some(row) => row,
                None => break,
            };
            let (best, best_score) = row
                .iter()
                .copied()
                .enumerate()
                .fold((0usize, f32::MIN), |acc, (i, s)| if s > acc.1 { (i, s) } else { acc });

            if best != 0 && best != previous {
                if let Some(ch) = self.charset.get(best) {
                    text.push_str(ch);
                    confidence_sum += best_score;
                    emitted += 1;
                }
            }
            previous = best;
        }

        let confidence = if emitted == 0 {
            0.0
        } else {
            confidence_sum / emitted as f32
        };
        (text, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn decoder() -> CtcDecoder {
        CtcDecoder::new(["0", "1", "2", "A", "B"].iter().map(|s| s.to_string()).collect())
    }

    /// One-hot score rows with the given top class and score.
    fn rows(classes: usize, picks: &[(usize, f32)]) -> Vec<f32> {
        let mut out = vec![0.0f32; picks.len() * classes];
        for (t, &(c, s)) in picks.iter().enumerate() {
            out[t * classes + c] = s;
        }
        out
    }

    #[test]
    fn test_charset_layout() {
        let d = decoder();
        // blank + 5 entries + space
        assert_eq!(d.num_classes(), 7);
    }

    #[test]
    fn test_collapses_repeats_and_blanks() {
        let d = decoder();
        // A A blank A B B → "AAB"
        let scores = rows(7, &[(4, 0.9), (4, 0.9), (0, 0.9), (4, 0.8), (5, 0.7), (5, 0.7)]);
        let (text, conf) = d.decode(&scores, 6, 7);
        assert_eq!(text, "AAB");
        assert_relative_eq!(conf, (0.9 + 0.8 + 0.7) / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_space_class_is_last() {
        let d = decoder();
        let scores = rows(7, &[(1, 0.9), (6, 0.9), (2, 0.9)]);
        assert_eq!(d.decode(&scores, 3, 7).0, "0 1");
    }

    #[test]
    fn test_all_blank_is_empty_with_zero_confidence() {
        let d = decoder();
        let scores = rows(7, &[(0, 0.99), (0, 0.99)]);
        assert_eq!(d.decode(&scores, 2, 7), (String::new(), 0.0));
    }

    #[test]
    fn test_short_buffer_stops_early() {
        let d = decoder();
        let scores = rows(7, &[(3, 0.9)]);
        assert_eq!(d.decode(&scores, 5, 7).0, "2");
    }

    #[test]
    fn test_from_file_reads_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.txt");
        fs::write(&path, "a\r\nb\nc\n").unwrap();
        let d = CtcDecoder::from_file(&path).unwrap();
        assert_eq!(d.num_classes(), 5);
        let scores = rows(5, &[(1, 1.0), (2, 1.0), (3, 1.0), (4, 1.0)]);
        assert_eq!(d.decode(&scores, 4, 5).0, "abc ");
    }
}
