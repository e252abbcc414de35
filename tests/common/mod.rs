//! テスト用のスプレッドシート作成ヘルパー

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::path::Path;

pub const HEADERS: [&str; 5] = ["Image", "Cat", "Subcat", "Key", "Value"];

/// 1シートの xlsx を作成する
pub fn write_sheet(path: &Path, headers: &[&str], rows: &[[&str; 5]]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).expect("ヘッダ書き込み失敗");
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                sheet
                    .write_string(r as u32 + 1, col as u16, *cell)
                    .expect("セル書き込み失敗");
            }
        }
    }

    workbook.save(path).expect("xlsx保存失敗");
}

/// 正解データ
pub fn ground_truth_rows() -> Vec<[&'static str; 5]> {
    vec![
        ["look1.jpg", "mood", "", "", "calm"],
        ["", "fashion style", "", "", "casual"],
        ["", "outer", "jacket", "color", "black"],
        ["", "", "", "fit", "oversize"],
        ["", "bottom", "jeans", "pattern", "solid"],
        ["look2.jpg", "mood", "", "", "bright"],
        ["", "shoes", "sneakers", "color", "white"],
        ["look9.jpg", "mood", "", "", "dark"],
    ]
}

/// VLM解析結果
pub fn vlm_rows() -> Vec<[&'static str; 5]> {
    vec![
        ["look1.png", "Mood", "", "", "Calm"],
        ["", "Fashion Style", "", "", "Casual, Street"],
        ["", "Outer", "Jackets", "color", "Black"],
        ["", "Bottom", "Pants", "pattern", "solid"],
        ["", "Bag", "Tote", "color", "brown"],
        ["look2.png", "Mood", "", "", "Gloomy"],
        ["", "Shoes", "Sneaker", "color", "White"],
        ["look3.png", "Error", "", "Exception", "timeout"],
    ]
}

/// ベンダー解析結果
pub fn vendor_rows() -> Vec<[&'static str; 5]> {
    vec![
        ["look1.jpg", "mood", "", "", "calm"],
        ["", "outer", "/", "color", "None"],
        ["look2.jpg", "shoes", "sneakers", "color", "white"],
    ]
}
