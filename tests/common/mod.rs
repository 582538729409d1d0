//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};

/// Cell of a fixture row: text, or a number written as a numeric cell.
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> From<&'a str> for Cell<'a> {
    fn from(text: &'a str) -> Self {
        Cell::Text(text)
    }
}

/// Write a workbook with one worksheet per `(name, rows)` entry.
pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<Cell<'_>>>)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet().set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text("") => {}
                    Cell::Text(text) => {
                        worksheet.write_string(r as u32, c as u16, *text).unwrap();
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r as u32, c as u16, *n).unwrap();
                    }
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

/// Text rows, for sheets without numeric cells.
pub fn text_rows<'a>(rows: &[&[&'a str]]) -> Vec<Vec<Cell<'a>>> {
    rows.iter()
        .map(|row| row.iter().map(|text| Cell::Text(*text)).collect())
        .collect()
}

pub const SHOP_REPOSITORY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ObjectRepository>
  <Browser name="Shop">
    <Page name="Login">
      <Property name="title" value="Shop - Login"/>
      <Control class="WebEdit" name="UserName">
        <Property name="html id" value="user"/>
        <Property name="name" value="username"/>
      </Control>
    </Page>
  </Browser>
</ObjectRepository>
"#;

pub const UFT_HEADER: [&str; 6] = ["Browser", "Page", "Object", "Identifier", "Keyword", "Value"];

/// Extracted UFT archive with one data-driven `Login` test script, its data
/// sheet, and the object repository.
pub fn uft_archive(root: &Path) -> PathBuf {
    let archive = root.join("ShopArchive");
    let framework = archive.join("Framework");
    for dir in ["TestCase", "DataSheet", "ObjectRepository"] {
        fs::create_dir_all(framework.join(dir)).unwrap();
    }

    write_workbook(
        &framework.join("TestCase").join("Login.xlsx"),
        &[(
            "Login",
            text_rows(&[
                &UFT_HEADER,
                &["Shop", "", "", "", "Open", "https://shop.example"],
                &["Shop", "Login", "", "", "", ""],
                &["", "", "WebEdit", "UserName", "SetValue", "DT_UserName"],
                &["", "", "WebButton", "html id:=submitBtn", "Click", ""],
                &["", "", "WebElement", "html id:=banner", "VerifyProperty", "color:red"],
                &["", "", "", "", "CloseWindow", "Shop"],
            ]),
        )],
    );

    write_workbook(
        &framework.join("DataSheet").join("Data.xlsx"),
        &[(
            "Global",
            vec![
                vec!["TC_Name".into(), "Iteration".into(), "UserName".into()],
                vec!["Login".into(), Cell::Number(1.0), "alice".into()],
                vec!["".into(), Cell::Number(2.0), "bob".into()],
            ],
        )],
    );

    fs::write(
        framework.join("ObjectRepository").join("Shop.xml"),
        SHOP_REPOSITORY,
    )
    .unwrap();
    archive
}

/// Add a script that fails with an unknown UFT class. Sorts before `Login.xlsx`.
pub fn add_broken_script(archive: &Path) {
    write_workbook(
        &archive.join("Framework").join("TestCase").join("Broken.xlsx"),
        &[(
            "Broken",
            text_rows(&[
                &UFT_HEADER,
                &["Shop", "title:=Legacy", "SwfWindow", "name:=main", "Click", ""],
            ]),
        )],
    );
}

/// Add a script whose `Coupon` control and `Payment` page are missing from the
/// repository. Sorts before `Login.xlsx`.
pub fn add_checkout_script(archive: &Path) {
    write_workbook(
        &archive.join("Framework").join("TestCase").join("Checkout.xlsx"),
        &[(
            "Checkout",
            text_rows(&[
                &UFT_HEADER,
                &["Shop", "Login", "", "", "", ""],
                &["", "", "WebEdit", "Coupon", "SetValue", "SPRING"],
                &["", "", "WebEdit", "UserName", "SetValue", "carol"],
                &["", "Payment", "", "", "", ""],
                &["", "", "WebButton", "html id:=pay", "Click", ""],
            ]),
        )],
    );
}
