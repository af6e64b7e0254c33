use crate::libs::error::ChainError;
use serde::Serialize;
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

/// Strand of the subject relative to the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl FromStr for Strand {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(ChainError::input(format!("Invalid strand: {}", s))),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A high-scoring pair: one local alignment between a query range and a subject range.
///
/// Coordinates are always stored ascending on both axes, whatever the strand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hsp {
    pub source_id: String,
    pub q_start: i64,
    pub q_end: i64,
    pub s_start: i64,
    pub s_end: i64,
    pub strand: Strand,
    pub score: f64,
}

impl Hsp {
    /// Creates a validated fragment.
    ///
    /// ```
    /// use hspchain::libs::hsp::{Hsp, Strand};
    ///
    /// let hsp = Hsp::new("III", 625, 802, 789, 999, Strand::Forward, 95.0).unwrap();
    /// assert_eq!(hsp.sort_key(), (625, 802, 789, 999));
    ///
    /// assert!(Hsp::new("III", 802, 625, 789, 999, Strand::Forward, 95.0).is_err());
    /// ```
    pub fn new(
        source_id: &str,
        q_start: i64,
        q_end: i64,
        s_start: i64,
        s_end: i64,
        strand: Strand,
        score: f64,
    ) -> Result<Self, ChainError> {
        let hsp = Hsp {
            source_id: source_id.to_string(),
            q_start,
            q_end,
            s_start,
            s_end,
            strand,
            score,
        };
        hsp.validate()?;
        Ok(hsp)
    }

    /// Coordinates must be non-negative and ascending, so gaps between any two
    /// fragments fit in `i64`. The score must be finite.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.q_start < 0 || self.s_start < 0 {
            return Err(ChainError::validation(format!(
                "negative coordinate in {}-{} / {}-{}",
                self.q_start, self.q_end, self.s_start, self.s_end
            )));
        }
        if self.q_end < self.q_start {
            return Err(ChainError::validation(format!(
                "query end {} is before query start {}",
                self.q_end, self.q_start
            )));
        }
        if self.s_end < self.s_start {
            return Err(ChainError::validation(format!(
                "subject end {} is before subject start {}",
                self.s_end, self.s_start
            )));
        }
        if !self.score.is_finite() {
            return Err(ChainError::validation(format!(
                "score {} is not finite",
                self.score
            )));
        }
        Ok(())
    }

    /// Ordering key inside a group.
    pub fn sort_key(&self) -> (i64, i64, i64, i64) {
        (self.q_start, self.q_end, self.s_start, self.s_end)
    }

    /// Parses a 12-column BLAST tabular row (`-outfmt 6`).
    ///
    /// qseqid sseqid pident length mismatch gapopen qstart qend sstart send evalue bitscore
    ///
    /// The subject name becomes the source id. Reversed ranges are swapped to ascending,
    /// and the strand is `-` when exactly one axis was reported reversed.
    pub fn from_blast6(s: &str) -> Result<Self, ChainError> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() < 12 {
            return Err(ChainError::input(format!(
                "Invalid BLAST line: expected 12 columns, found {}",
                fields.len()
            )));
        }

        let q_a = parse_coord(fields[6])?;
        let q_b = parse_coord(fields[7])?;
        let s_a = parse_coord(fields[8])?;
        let s_b = parse_coord(fields[9])?;
        let score = parse_score(fields[11])?;

        let strand = if (q_a > q_b) != (s_a > s_b) {
            Strand::Reverse
        } else {
            Strand::Forward
        };

        Hsp::new(
            fields[1],
            q_a.min(q_b),
            q_a.max(q_b),
            s_a.min(s_b),
            s_a.max(s_b),
            strand,
            score,
        )
    }
}

fn parse_coord(s: &str) -> Result<i64, ChainError> {
    s.parse::<i64>()
        .map_err(|_| ChainError::input(format!("Invalid coordinate: {}", s)))
}

fn parse_score(s: &str) -> Result<f64, ChainError> {
    s.parse::<f64>()
        .map_err(|_| ChainError::input(format!("Invalid score: {}", s)))
}

/// Parses the 7-field record `sourceId qStart qEnd sStart sEnd strand score`.
impl FromStr for Hsp {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 7 {
            return Err(ChainError::input(format!(
                "Invalid HSP line: expected 7 fields, found {}",
                fields.len()
            )));
        }

        Hsp::new(
            fields[0],
            parse_coord(fields[1])?,
            parse_coord(fields[2])?,
            parse_coord(fields[3])?,
            parse_coord(fields[4])?,
            fields[5].parse()?,
            parse_score(fields[6])?,
        )
    }
}

impl fmt::Display for Hsp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.source_id,
            self.q_start,
            self.q_end,
            self.s_start,
            self.s_end,
            self.strand,
            self.score
        )
    }
}

/// Layout of input records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// sourceId qStart qEnd sStart sEnd strand score
    Tsv,
    /// BLAST `-outfmt 6`
    Blast,
}

impl FromStr for InputFormat {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tsv" => Ok(InputFormat::Tsv),
            "blast" => Ok(InputFormat::Blast),
            _ => Err(ChainError::input(format!("Unknown input format: {}", s))),
        }
    }
}

/// Reads every record, failing on the first malformed line.
///
/// Empty lines and lines starting with `#` are skipped.
pub fn read_hsps<R: BufRead>(reader: R, format: InputFormat) -> Result<Vec<Hsp>, ChainError> {
    let mut hsps = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let hsp = match format {
            InputFormat::Tsv => line.parse::<Hsp>(),
            InputFormat::Blast => Hsp::from_blast6(line),
        }
        .map_err(|e| e.at_line(i + 1))?;
        hsps.push(hsp);
    }

    Ok(hsps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_tsv() {
        let hsp: Hsp = "III\t1573\t1729\t110912\t111079\t+\t102".parse().unwrap();
        assert_eq!(hsp.source_id, "III");
        assert_eq!(hsp.sort_key(), (1573, 1729, 110912, 111079));
        assert_eq!(hsp.strand, Strand::Forward);
        assert_eq!(hsp.score, 102.0);
        assert_eq!(
            hsp.to_string(),
            "III\t1573\t1729\t110912\t111079\t+\t102"
        );
    }

    #[test]
    fn test_parse_errors() {
        let err = "III\t1573\t1729\t110912\t111079\t+".parse::<Hsp>().unwrap_err();
        assert!(matches!(err, ChainError::Input { .. }));

        let err = "III\t1573\tabc\t110912\t111079\t+\t102".parse::<Hsp>().unwrap_err();
        assert!(matches!(err, ChainError::Input { .. }));

        let err = "III\t1573\t1729\t110912\t111079\t*\t102".parse::<Hsp>().unwrap_err();
        assert!(matches!(err, ChainError::Input { .. }));

        let err = "III\t1729\t1573\t110912\t111079\t+\t102".parse::<Hsp>().unwrap_err();
        assert!(matches!(err, ChainError::Validation { .. }));

        let err = "III\t1573\t1729\t110912\t111079\t+\tNaN".parse::<Hsp>().unwrap_err();
        assert!(matches!(err, ChainError::Validation { .. }));
    }

    #[test]
    fn test_coordinate_range() {
        let err = "III\t-9000000000000000000\t9000000000000000000\t0\t10\t+\t1"
            .parse::<Hsp>()
            .unwrap_err();
        assert!(matches!(err, ChainError::Validation { .. }));
        assert!(err.to_string().contains("negative coordinate"));

        let err = Hsp::new("III", 0, 10, -1, 10, Strand::Forward, 1.0).unwrap_err();
        assert!(matches!(err, ChainError::Validation { .. }));

        let hsp = Hsp::new("III", 0, i64::MAX, 0, i64::MAX, Strand::Forward, 1.0).unwrap();
        assert_eq!(hsp.q_end, i64::MAX);
    }

    #[test]
    fn test_parse_blast6() {
        let hsp =
            Hsp::from_blast6("q1\tchr2\t98.5\t200\t3\t0\t1\t200\t5200\t5001\t1e-50\t350")
                .unwrap();
        assert_eq!(hsp.source_id, "chr2");
        assert_eq!(hsp.strand, Strand::Reverse);
        assert_eq!(hsp.sort_key(), (1, 200, 5001, 5200));
        assert_eq!(hsp.score, 350.0);

        let hsp =
            Hsp::from_blast6("q1\tchr2\t98.5\t200\t3\t0\t1\t200\t5001\t5200\t1e-50\t350")
                .unwrap();
        assert_eq!(hsp.strand, Strand::Forward);
    }

    #[test]
    fn test_read_hsps() {
        let input = "# comment\n\nIII\t625\t802\t789\t999\t+\t95\nIII\t973\t1105\t110439\t110578\t-\t68\n";
        let hsps = read_hsps(Cursor::new(input), InputFormat::Tsv).unwrap();
        assert_eq!(hsps.len(), 2);
        assert_eq!(hsps[1].strand, Strand::Reverse);

        let input = "III\t625\t802\t789\t999\t+\t95\nIII\t973\t1105\n";
        let err = read_hsps(Cursor::new(input), InputFormat::Tsv).unwrap_err();
        match err {
            ChainError::Input { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }
}
