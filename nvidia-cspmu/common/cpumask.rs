// Set of CPUs associated with a PMU, in kernel cpulist notation ("0-3,8-11")

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{CspmuError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuMask {
    cpus: BTreeSet<u32>,
}

impl CpuMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cpus(cpus: impl IntoIterator<Item = u32>) -> Self {
        Self {
            cpus: cpus.into_iter().collect(),
        }
    }

    /// Parse a cpulist like "0-3,8-11"; whitespace and empty parts are ignored
    pub fn parse(s: &str) -> Result<Self> {
        let mut cpus = BTreeSet::new();
        for part in s.trim().split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((start, end)) = part.split_once('-') {
                let start = parse_cpu(start)?;
                let end = parse_cpu(end)?;
                if start > end {
                    return Err(CspmuError::ParseError(format!(
                        "Descending CPU range: {part}"
                    )));
                }
                cpus.extend(start..=end);
            } else {
                cpus.insert(parse_cpu(part)?);
            }
        }
        Ok(Self { cpus })
    }

    /// Lowest CPU in the mask
    pub fn first(&self) -> Option<u32> {
        self.cpus.iter().next().copied()
    }

    pub fn contains(&self, cpu: u32) -> bool {
        self.cpus.contains(&cpu)
    }

    pub fn insert(&mut self, cpu: u32) {
        self.cpus.insert(cpu);
    }

    pub fn len(&self) -> usize {
        self.cpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cpus.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.cpus.iter().copied()
    }
}

/// Upper bound on CPU ids accepted from a cpulist
pub const MAX_CPUS: u32 = 65536;

fn parse_cpu(s: &str) -> Result<u32> {
    let cpu: u32 = s
        .trim()
        .parse()
        .map_err(|e| CspmuError::ParseError(format!("Invalid CPU id {s:?}: {e}")))?;
    if cpu >= MAX_CPUS {
        return Err(CspmuError::ParseError(format!(
            "CPU id {cpu} exceeds the supported maximum of {}",
            MAX_CPUS - 1
        )));
    }
    Ok(cpu)
}

impl FromStr for CpuMask {
    type Err = CspmuError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CpuMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut iter = self.cpus.iter().copied().peekable();
        while let Some(start) = iter.next() {
            let mut end = start;
            while iter.peek() == Some(&(end + 1)) {
                end += 1;
                iter.next();
            }

            if !first {
                f.write_str(",")?;
            }
            first = false;

            if start == end {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}-{end}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpulist() {
        let mask = CpuMask::parse("0-3,8-11").unwrap();
        assert_eq!(mask.len(), 8);
        assert!(mask.contains(2));
        assert!(!mask.contains(5));
        assert_eq!(mask.first(), Some(0));

        let mask = CpuMask::parse(" 72-143\n").unwrap();
        assert_eq!(mask.first(), Some(72));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CpuMask::parse("0-x").is_err());
        assert!(CpuMask::parse("5-2").is_err());
        assert!(CpuMask::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_oversized_ids() {
        assert!(CpuMask::parse("0-4294967295").is_err());
        assert!(CpuMask::parse("65536").is_err());
        assert!(CpuMask::parse("0,70000-70001").is_err());

        let mask = CpuMask::parse("65530-65535").unwrap();
        assert_eq!(mask.len(), 6);
    }

    #[test]
    fn test_display_compacts_ranges() {
        let mask = CpuMask::from_cpus([0, 1, 2, 3, 8, 10, 11]);
        assert_eq!(mask.to_string(), "0-3,8,10-11");
        assert_eq!(CpuMask::new().to_string(), "");
    }
}
