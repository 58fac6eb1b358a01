//! 文件名令牌提取
//!
//! # 设计思路
//!
//! 序号、施设 ID、商品代码都从文件名里“抠”出来。商品代码有一串按顺序尝试的规则，
//! 这里用有序数组 `PRODUCT_CODE_RULES` 表达，前一条不匹配才尝试下一条，
//! 调整顺序或新增规则只需改数组。
//!
//! # 实现思路
//!
//! - 所有正则通过 `once_cell::sync::Lazy` 在首次调用时编译。
//! - 数字只识别 ASCII `0-9`。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::image_handler::{file_extension, file_stem};

/// 商品代码缺省字母。
pub const DEFAULT_PRODUCT_LETTERS: &str = "CTRG";

/// 缺省商品编号。
pub const DEFAULT_PRODUCT_NUMBER: &str = "0000";

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());
static EMBEDDED_PRODUCT_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Product_([A-Za-z]+)-([0-9]+)_").unwrap());
static EMBEDDED_PRODUCT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Product_([A-Za-z]+)").unwrap());
static LETTERS_DASH_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z]+)-([0-9]+)").unwrap());
static ALPHA_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{2,}").unwrap());
static EXTENSION_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

/// 作为扩展名出现时不能当作商品字母的图片后缀。
const IMAGE_EXTENSION_TOKENS: &[&str] = &["WEBP", "JPG", "JPEG", "PNG"];

/// 最后一段连续数字（例如 `IMG_2024_015` → `015`）。
pub fn last_digit_run(text: &str) -> Option<&str> {
    DIGIT_RUN.find_iter(text).last().map(|m| m.as_str())
}

/// 第一段连续数字（例如 `12_entrance_3` → `12`）。
pub fn first_digit_run(text: &str) -> Option<&str> {
    DIGIT_RUN.find(text).map(|m| m.as_str())
}

/// 左侧补零到 `width` 位，超长时不截断。
pub fn zfill(value: &str, width: usize) -> String {
    format!("{:0>width$}", value, width = width)
}

/// 商品代码：字母部分（大写）+ 编号（未补零）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCode {
    pub letters: String,
    pub number: String,
}

impl ProductCode {
    fn new(letters: &str, number: &str) -> Self {
        Self {
            letters: letters.to_uppercase(),
            number: number.to_string(),
        }
    }
}

struct ProductInput<'a> {
    file_name: &'a str,
    stem: &'a str,
}

impl ProductInput<'_> {
    fn last_number(&self) -> &str {
        last_digit_run(self.stem).unwrap_or(DEFAULT_PRODUCT_NUMBER)
    }
}

type ProductRule = fn(&ProductInput<'_>) -> Option<ProductCode>;

/// 商品代码规则表，自上而下，第一条命中即返回。
const PRODUCT_CODE_RULES: &[(&str, ProductRule)] = &[
    ("embedded-dash", embedded_dash),
    ("embedded-prefix", embedded_prefix),
    ("letters-dash-digits", letters_dash_digits),
    ("digits-only", digits_only),
    ("alpha-run", alpha_run),
    ("extension", extension_letters),
    ("default", default_letters),
];

fn embedded_dash(input: &ProductInput<'_>) -> Option<ProductCode> {
    EMBEDDED_PRODUCT_DASH
        .captures(input.stem)
        .map(|caps| ProductCode::new(&caps[1], &caps[2]))
}

fn embedded_prefix(input: &ProductInput<'_>) -> Option<ProductCode> {
    EMBEDDED_PRODUCT_PREFIX
        .captures(input.stem)
        .map(|caps| ProductCode::new(&caps[1], input.last_number()))
}

fn letters_dash_digits(input: &ProductInput<'_>) -> Option<ProductCode> {
    LETTERS_DASH_DIGITS
        .captures(input.stem)
        .map(|caps| ProductCode::new(&caps[1], &caps[2]))
}

fn digits_only(input: &ProductInput<'_>) -> Option<ProductCode> {
    let all_digits = !input.stem.is_empty() && input.stem.bytes().all(|b| b.is_ascii_digit());
    all_digits.then(|| ProductCode::new(DEFAULT_PRODUCT_LETTERS, input.stem))
}

fn alpha_run(input: &ProductInput<'_>) -> Option<ProductCode> {
    ALPHA_RUN
        .find(input.stem)
        .map(|m| ProductCode::new(m.as_str(), input.last_number()))
}

fn extension_letters(input: &ProductInput<'_>) -> Option<ProductCode> {
    let ext = file_extension(input.file_name)?;
    if !EXTENSION_TOKEN.is_match(ext) {
        return None;
    }
    let upper = ext.to_uppercase();
    if IMAGE_EXTENSION_TOKENS.contains(&upper.as_str()) {
        return None;
    }
    Some(ProductCode::new(&upper, input.last_number()))
}

fn default_letters(input: &ProductInput<'_>) -> Option<ProductCode> {
    Some(ProductCode::new(DEFAULT_PRODUCT_LETTERS, input.last_number()))
}

/// 按规则表从文件名提取商品代码，返回命中的规则名与结果。
pub fn extract_product_code(file_name: &str) -> (&'static str, ProductCode) {
    let input = ProductInput {
        file_name,
        stem: file_stem(file_name),
    };

    PRODUCT_CODE_RULES
        .iter()
        .find_map(|(name, rule)| rule(&input).map(|code| (*name, code)))
        .unwrap_or_else(|| {
            (
                "default",
                ProductCode::new(DEFAULT_PRODUCT_LETTERS, input.last_number()),
            )
        })
}
