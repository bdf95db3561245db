use core::fmt;

/// Diagnostic counters for one search. Wasted counts are the nodes spent on
/// a speculation that had to be repeated at full strength.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchStats {
    pub total_nodes: u64,
    pub success_nm: u64,
    pub failed_nm: u64,
    pub wasted_nm: u64,
    pub success_lmr: u64,
    pub failed_lmr: u64,
    pub wasted_lmr: u64,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "============ OVERALL STATS ============")?;
        writeln!(f, "Total Nodes : {}", self.total_nodes)?;
        writeln!(f, "NM Success  : {}", self.success_nm)?;
        writeln!(f, "NM Failed   : {}", self.failed_nm)?;
        writeln!(f, "NM Wasted   : {}", self.wasted_nm)?;
        writeln!(f, "LMR Success : {}", self.success_lmr)?;
        writeln!(f, "LMR Failed  : {}", self.failed_lmr)?;
        writeln!(f, "LMR Wasted  : {}", self.wasted_lmr)?;
        write!(f, "=======================================")
    }
}
