//! Startup banner and run summary display.

use crate::engine::RunSummary;

/// Run configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub handle: &'a str,
    pub service: &'a str,
    pub tag_count: usize,
    pub ceiling: usize,
    pub ledger: &'a str,
}

/// Print the startup banner with run info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║             H E R A L D               ║
   ║    finds tagged posts, passes them on ║
   ╚═══════════════════════════════════════╝

   version   {}
   account   {}
   service   {}
   tags      {} monitored
   ceiling   {} reposts per run
   ledger    {}
"#,
        env!("CARGO_PKG_VERSION"),
        info.handle,
        info.service,
        info.tag_count,
        info.ceiling,
        info.ledger,
    );
}

/// Print the end-of-run summary.
pub fn print_run_summary(summary: &RunSummary) {
    println!(
        "\nrun complete: {} candidates, {} attempted, {} reposted",
        summary.candidates, summary.attempted, summary.reposted
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_banner_does_not_panic() {
        let info = BannerInfo {
            handle: "bot.example.com",
            service: "https://bsky.social",
            tag_count: 11,
            ceiling: 5,
            ledger: "ephemeral",
        };
        print_banner(&info);
    }

    #[test]
    fn print_run_summary_does_not_panic() {
        print_run_summary(&RunSummary {
            candidates: 12,
            attempted: 3,
            reposted: 2,
        });
    }
}
