use flexi_logger::{DeferredNow, Record, style};

/// `HH:MM:SS LEVEL [target] message`, level colored.
pub fn cli_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let level = record.level();
    write!(
        w,
        "{} {} [{}] {}",
        now.format("%H:%M:%S"),
        style(level).paint(level.to_string()),
        record.target(),
        record.args()
    )
}
