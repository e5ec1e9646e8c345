use crate::args::TotalArgs;
use crate::commands::Out;
use crate::ledger::Ledger;
use crate::summary::Summary;
use crate::{Config, Result};
use chrono::{DateTime, Local, TimeZone};

/// Shows the total spent in the current period.
pub fn total(config: Config, args: TotalArgs) -> Result<Out<Summary>> {
    total_at(config, args, &Local::now())
}

pub(crate) fn total_at<Tz: TimeZone>(
    config: Config,
    args: TotalArgs,
    now: &DateTime<Tz>,
) -> Result<Out<Summary>> {
    let ledger = Ledger::open(config.storage())?;
    let summary = Summary::for_period(ledger.expenses(), args.period(), now);
    let message = summary.line(config.money_format());
    Ok(Out::new(message, summary).with_recovery(ledger.recovery()))
}
