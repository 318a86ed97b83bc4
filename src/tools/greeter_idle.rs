//! swayidle hook for the greeter session: power all outputs on or off.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::sway::{connect, set_power_all};
use crate::utils::error::Result;
use clap::{ArgGroup, Parser};

#[derive(Debug, Clone, Parser)]
#[command(name = "greeter-idle", about = "Wrapper for swayidle operations")]
#[command(group(ArgGroup::new("power").required(true)))]
pub struct GreeterIdleArgs {
    /// Power all outputs on
    #[arg(long, group = "power")]
    pub display_on: bool,

    /// Power all outputs off
    #[arg(long, group = "power")]
    pub display_off: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: GreeterIdleArgs, _config: ToolboxConfig) -> Result<()> {
    let on = args.display_on;
    let count = tokio::task::spawn_blocking(move || {
        let mut conn = connect()?;
        set_power_all(&mut conn, on)
    })
    .await??;
    tracing::debug!("Switched {} outputs {}", count, if on { "on" } else { "off" });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_mode() {
        let args = GreeterIdleArgs::try_parse_from(["greeter-idle", "--display-off"]).unwrap();
        assert!(!args.display_on);
        assert!(GreeterIdleArgs::try_parse_from(["greeter-idle"]).is_err());
        assert!(
            GreeterIdleArgs::try_parse_from(["greeter-idle", "--display-on", "--display-off"])
                .is_err()
        );
    }
}
