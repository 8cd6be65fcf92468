use super::{ExportError, ResultTable};
use crate::workflows::lottery::report::LotteryReport;

pub fn result_csv(report: &LotteryReport) -> Result<Vec<u8>, ExportError> {
    let table = ResultTable::from_report(report);
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|err| {
        let source = err.error();
        ExportError::Io(std::io::Error::new(source.kind(), source.to_string()))
    })
}
