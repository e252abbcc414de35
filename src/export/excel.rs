//! Excel生成
//!
//! Summary シートとソースごとのシートを持つレポートを書き出す。
//! 判定に応じてセルを塗り分ける（赤: 不一致・欠落・新規分類・小分類誤り、緑: 追加）。

use crate::compare::{ComparisonReport, ImageOutcome, ImageReport};
use crate::error::Result;
use fashion_eval_common::{CandidateSource, Fill, VerdictRow};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};
use std::path::Path;

pub const SUMMARY_SHEET: &str = "Summary";

const TABLE_HEADERS: [&str; 5] = ["Cat", "Subcat", "Key", "Value", "Verdict"];

struct Formats {
    title: Format,
    header: Format,
    percent: Format,
    red: Format,
    green: Format,
    plain: Format,
}

impl Formats {
    fn new() -> Self {
        let cell = Format::new()
            .set_border(FormatBorder::Hair)
            .set_border_color(Color::RGB(0xCCCCCC));
        Self {
            title: Format::new().set_bold().set_font_size(12.0),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xF5F5F5))
                .set_border(FormatBorder::Hair)
                .set_border_color(Color::RGB(0xAAAAAA)),
            percent: Format::new().set_num_format("0.0"),
            red: cell.clone().set_background_color(Color::RGB(Fill::Red.rgb())),
            green: cell.clone().set_background_color(Color::RGB(Fill::Green.rgb())),
            plain: cell,
        }
    }

    fn fill(&self, fill: Option<Fill>) -> &Format {
        match fill {
            Some(Fill::Red) => &self.red,
            Some(Fill::Green) => &self.green,
            None => &self.plain,
        }
    }
}

pub fn generate_excel(report: &ComparisonReport, output_path: &Path) -> Result<()> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet();
    summary.set_name(SUMMARY_SHEET)?;
    write_summary(summary, report, &formats)?;

    for info in report.sources.iter().filter(|s| s.loaded) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(info.source.label())?;
        write_source_sheet(worksheet, report, info.source, &formats)?;
    }

    workbook.save(output_path)?;
    Ok(())
}

fn write_summary(sheet: &mut Worksheet, report: &ComparisonReport, f: &Formats) -> Result<()> {
    sheet.write_string_with_format(0, 0, "精度サマリー", &f.title)?;
    sheet.write_string(1, 0, format!("生成日時: {}", report.generated_at))?;

    let headers = [
        "Source",
        "File",
        "Images",
        "Marketing",
        "Product",
        "Combined",
        "Brand",
        "Product Name",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(3, col as u16, *header, &f.header)?;
    }

    let mut row = 4;
    for info in &report.sources {
        sheet.write_string(row, 0, info.source.label())?;
        match (&info.origin, &info.error) {
            (Some(origin), _) => sheet.write_string(row, 1, origin.display().to_string())?,
            (None, Some(error)) => sheet.write_string(row, 1, format!("利用不可: {}", error))?,
            (None, None) => sheet.write_string(row, 1, "")?,
        };
        if let Some(avg) = report.summary.source(info.source) {
            sheet.write_number(row, 2, avg.images as f64)?;
            sheet.write_number_with_format(row, 3, avg.marketing_accuracy, &f.percent)?;
            sheet.write_number_with_format(row, 4, avg.product_accuracy, &f.percent)?;
            sheet.write_number_with_format(row, 5, avg.combined_accuracy, &f.percent)?;
            sheet.write_number(row, 6, avg.brand_images as f64)?;
            sheet.write_number(row, 7, avg.product_name_images as f64)?;
        }
        row += 1;
    }

    row += 1;
    sheet.write_string(row, 0, "正解項目数")?;
    sheet.write_number(row, 1, report.summary.unique_ground_truth_items as f64)?;
    sheet.write_string(row + 1, 0, "未比較の正解画像")?;
    sheet.write_number(row + 1, 1, report.summary.uncompared_ground_truth_images as f64)?;

    sheet.set_column_width(0, 18)?;
    sheet.set_column_width(1, 40)?;
    Ok(())
}

fn write_source_sheet(
    sheet: &mut Worksheet,
    report: &ComparisonReport,
    source: CandidateSource,
    f: &Formats,
) -> Result<()> {
    let mut row: u32 = 0;
    for image in &report.images {
        let Some(outcome) = image.outcome(source) else {
            continue;
        };
        row = write_image_block(sheet, row, image, outcome, f)?;
        row += 1;
    }

    sheet.set_column_width(0, 22)?;
    sheet.set_column_width(1, 18)?;
    sheet.set_column_width(2, 18)?;
    sheet.set_column_width(3, 36)?;
    sheet.set_column_width(4, 14)?;
    Ok(())
}

/// 1画像分のブロックを書き、次の空き行を返す
fn write_image_block(
    sheet: &mut Worksheet,
    mut row: u32,
    image: &ImageReport,
    outcome: &ImageOutcome,
    f: &Formats,
) -> Result<u32> {
    sheet.write_string_with_format(row, 0, &image.image, &f.title)?;
    row += 1;

    let (record, table) = match outcome {
        ImageOutcome::Compared { record, table } => (record, table),
        ImageOutcome::Failed => {
            sheet.write_string(row, 0, "解析失敗")?;
            return Ok(row + 1);
        }
        ImageOutcome::NotAnalyzed => {
            sheet.write_string(row, 0, "未解析")?;
            return Ok(row + 1);
        }
        ImageOutcome::NoGroundTruth => {
            sheet.write_string(row, 0, "正解データなし")?;
            return Ok(row + 1);
        }
    };

    sheet.write_string(
        row,
        0,
        format!(
            "マーケティング {:.1}% ({}/{}, 追加 {})  商品 {:.1}% (値 {}/{}, 小分類誤り {}, 追加 {})",
            record.marketing_accuracy,
            record.marketing_match,
            record.marketing_total,
            record.marketing_extra,
            record.product_accuracy,
            record.product_match,
            record.product_total,
            record.subcat_errors,
            record.product_extra,
        ),
    )?;
    row += 1;

    for (col, header) in TABLE_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *header, &f.header)?;
    }
    row += 1;

    for verdict_row in &table.rows {
        write_verdict_row(sheet, row, verdict_row, f)?;
        row += 1;
    }

    Ok(row)
}

fn write_verdict_row(sheet: &mut Worksheet, row: u32, v: &VerdictRow, f: &Formats) -> Result<()> {
    let fills = v.fills();
    let cell = |own: Option<Fill>| f.fill(fills.row.or(own));
    let verdict = v.verdict.map(|v| v.label()).unwrap_or("");

    sheet.write_string_with_format(row, 0, &v.cat, cell(None))?;
    sheet.write_string_with_format(row, 1, &v.subcat, cell(fills.subcat))?;
    sheet.write_string_with_format(row, 2, &v.key, cell(None))?;
    sheet.write_string_with_format(row, 3, &v.value, cell(fills.value))?;
    sheet.write_string_with_format(row, 4, verdict, cell(None))?;
    Ok(())
}
