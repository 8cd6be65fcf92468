use super::{ExportError, ResultTable};
use crate::workflows::lottery::report::LotteryReport;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

/// One worksheet: a bold header row followed by plain string rows.
pub(super) struct Sheet<'a> {
    pub(super) name: &'a str,
    pub(super) headers: &'a [&'a str],
    pub(super) rows: Vec<Vec<String>>,
}

pub(super) fn write_workbook(sheets: &[Sheet<'_>]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;
        write_sheet(worksheet, sheet, &header_format)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &Sheet<'_>,
    header_format: &Format,
) -> Result<(), ExportError> {
    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, header_format)?;
    }

    for (index, row) in sheet.rows.iter().enumerate() {
        let r = (index + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(r, col as u16, value)?;
        }
    }

    Ok(())
}

/// Workbook with the assignment table and a summary sheet for the draw.
pub fn result_xlsx(report: &LotteryReport) -> Result<Vec<u8>, ExportError> {
    let table = ResultTable::from_report(report);

    let mut summary = vec![
        vec!["Sorteio".to_string(), report.lottery_id.clone()],
        vec![
            "Data".to_string(),
            report.drawn_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ],
        vec!["Vagas sorteadas".to_string(), report.drawn.to_string()],
        vec!["Vagas sem morador".to_string(), report.unassigned.to_string()],
    ];
    summary.extend(
        report
            .warnings
            .iter()
            .map(|warning| vec!["Aviso".to_string(), (*warning).to_string()]),
    );

    write_workbook(&[
        Sheet {
            name: "Resultado",
            headers: &table.headers,
            rows: table.rows.into_iter().map(Vec::from).collect(),
        },
        Sheet {
            name: "Resumo",
            headers: &["Campo", "Valor"],
            rows: summary,
        },
    ])
}
