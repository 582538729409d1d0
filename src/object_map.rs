//! Closed lookup tables from source-tool vocabulary to the target model.

use crate::error::{ConnectorError, ConnectorResult};

/// UFT test object class → business type of the created control
const UFT_BUSINESS_TYPES: &[(&str, &str)] = &[
    ("Browser", "Browser"),
    ("Page", "Page"),
    ("Frame", "Frame"),
    ("WebEdit", "TextBox"),
    ("WebButton", "Button"),
    ("WebCheckBox", "CheckBox"),
    ("WebRadioGroup", "RadioButton"),
    ("WebList", "ComboBox"),
    ("WebTable", "Table"),
    ("WebElement", "Control"),
    ("WebArea", "Control"),
    ("WebFile", "FileUpload"),
    ("Link", "Link"),
    ("Image", "Image"),
];

/// UFT identification property → technical identifier
const UFT_TECHNICAL_IDS: &[(&str, &str)] = &[
    ("html id", "Id"),
    ("id", "Id"),
    ("name", "Name"),
    ("html tag", "Tag"),
    ("innertext", "InnerText"),
    ("text", "InnerText"),
    ("xpath", "XPath"),
    ("class", "ClassName"),
    ("title", "Title"),
    ("href", "Href"),
    ("url", "Url"),
    ("type", "Type"),
    ("value", "Value"),
    ("alt", "Alt"),
    ("src", "Src"),
];

/// Selenium locator strategy → technical identifier
const SELENIUM_TECHNICAL_IDS: &[(&str, &str)] = &[
    ("id", "Id"),
    ("name", "Name"),
    ("xpath", "XPath"),
    ("className", "ClassName"),
    ("linkText", "InnerText"),
    ("tagName", "Tag"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Business type for a UFT test object class.
pub fn business_type(uft_class: &str) -> ConnectorResult<&'static str> {
    lookup(UFT_BUSINESS_TYPES, uft_class).ok_or_else(|| {
        ConnectorError::Mapping(format!("unknown UFT object class '{}'", uft_class))
    })
}

/// Technical identifier for a UFT identification property. Case-insensitive,
/// since UFT records property names inconsistently.
pub fn technical_id(uft_property: &str) -> ConnectorResult<&'static str> {
    let key = uft_property.trim().to_lowercase();
    lookup(UFT_TECHNICAL_IDS, &key).ok_or_else(|| {
        ConnectorError::Mapping(format!(
            "unknown UFT identification property '{}'",
            uft_property
        ))
    })
}

/// Technical identifier for a Selenium locator strategy.
pub fn locator_technical_id(locator_type: &str) -> ConnectorResult<&'static str> {
    lookup(SELENIUM_TECHNICAL_IDS, locator_type).ok_or_else(|| {
        ConnectorError::Mapping(format!("unknown Selenium locator type '{}'", locator_type))
    })
}
