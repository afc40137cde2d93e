use std::fmt;

const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Byte and line totals for one side of a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub bytes: u64,
    pub lines: u64,
}

/// Final counters for both sides, printed when statistics are requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub input: Counters,
    pub output: Counters,
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "statistics")?;
        for (title, counters) in [("input file", self.input), ("output file", self.output)] {
            writeln!(f)?;
            writeln!(f, "{title}")?;
            writeln!(f, "{RULE}")?;
            writeln!(f, "total lines : {}", counters.lines)?;
            writeln!(f, "total size  : {} bytes", counters.bytes)?;
        }
        Ok(())
    }
}
