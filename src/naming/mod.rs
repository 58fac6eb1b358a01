//! # 命名模块（naming）
//!
//! ## 设计思路
//!
//! 每个流水线档位对应一种命名方案 `NamingScheme`。对单个文件的判定顺序固定：
//! 1. 已带规范前缀（如 `Facility_`）的文件名原样保留，只把扩展名改为 `.webp`
//! 2. 从文件名提取令牌（序号、施设 ID、商品代码）
//! 3. 布局方案按关键字表分类
//! 4. 都不满足时返回 `Unclassifiable`，由上层跳过并记录
//!
//! ## 实现思路
//!
//! - 回退序号 `SequenceCounter` 由批处理编排层持有，以 `&mut` 传入；
//!   只有真正用到回退序号的文件才会推进计数。
//! - 标识符（施设 ID、会场编号、路线编号）在构造方案时校验，只接受 ASCII 数字。

pub mod layout;
pub mod tokens;

use serde::Serialize;

use crate::error::AppError;
use crate::image_handler::file_stem;

use self::tokens::{extract_product_code, first_digit_run, last_digit_run, zfill};

/// 单个文件的命名结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NamingDecision {
    /// 已是规范名称，仅规范化扩展名。
    PreserveOriginal { file_name: String },
    /// 按方案生成的新名称。
    Renamed { file_name: String },
    /// 无法归类，该文件不会进入输出目录。
    Unclassifiable { reason: String },
}

impl NamingDecision {
    /// 输出文件名；无法归类时返回 `None`。
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Self::PreserveOriginal { file_name } | Self::Renamed { file_name } => Some(file_name),
            Self::Unclassifiable { .. } => None,
        }
    }
}

/// 单次运行内共享的回退序号，从 1 开始。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCounter {
    next: u32,
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出当前序号并推进。
    pub fn next_value(&mut self) -> u32 {
        let value = self.next;
        self.next += 1;
        value
    }

    /// 下一次 `next_value` 将返回的值。
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// 命名方案。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingScheme {
    Facility { facility_id: String },
    FloorMap { facility_id: String },
    Layout { venue_number: String },
    Access,
    Entrance,
    Product,
    Route { facility_id: String, route_number: String },
    /// 保持原文件名。
    KeepName,
}

impl NamingScheme {
    pub fn facility(facility_id: &str) -> Result<Self, AppError> {
        Ok(Self::Facility {
            facility_id: validate_identifier("施设 ID", facility_id)?,
        })
    }

    pub fn floor_map(facility_id: &str) -> Result<Self, AppError> {
        Ok(Self::FloorMap {
            facility_id: validate_identifier("施设 ID", facility_id)?,
        })
    }

    pub fn layout(venue_number: &str) -> Result<Self, AppError> {
        Ok(Self::Layout {
            venue_number: validate_identifier("会场编号", venue_number)?,
        })
    }

    pub fn route(facility_id: &str, route_number: &str) -> Result<Self, AppError> {
        Ok(Self::Route {
            facility_id: validate_identifier("施设 ID", facility_id)?,
            route_number: validate_identifier("路线编号", route_number)?,
        })
    }

    /// 规范前缀，带此前缀的文件名视为已命名。
    pub fn canonical_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Facility { .. } => Some("Facility_"),
            Self::FloorMap { .. } => Some("FloorMap_"),
            Self::Layout { .. } => Some("Layout_"),
            Self::Access => Some("Access_"),
            Self::Entrance => Some("Entrance_"),
            Self::Product => Some("Product_"),
            Self::Route { .. } => Some("Route_"),
            Self::KeepName => None,
        }
    }

    /// 为单个文件计算命名结果。
    ///
    /// # 示例
    /// ```rust
    /// use listing_image_prep::naming::{NamingScheme, SequenceCounter};
    ///
    /// let mut counter = SequenceCounter::new();
    /// let decision = NamingScheme::Product.decide("CTRG-2415.webp", &mut counter);
    /// assert_eq!(decision.output_name(), Some("Product_CTRG_2415.webp"));
    /// ```
    pub fn decide(&self, file_name: &str, counter: &mut SequenceCounter) -> NamingDecision {
        let stem = file_stem(file_name);

        let Some(prefix) = self.canonical_prefix() else {
            return preserve(stem);
        };
        if file_name.starts_with(prefix) {
            return preserve(stem);
        }

        match self {
            Self::Facility { facility_id } => {
                let n = sequence_or_counter(stem, counter);
                renamed(format!("Facility_{}_image_{}", zfill(facility_id, 3), n))
            }
            Self::FloorMap { facility_id } => match last_digit_run(stem) {
                Some(floor) => renamed(format!("FloorMap_{}_a{}_1", zfill(facility_id, 3), floor)),
                None => unclassifiable("文件名中没有楼层数字"),
            },
            Self::Layout { venue_number } => match layout::classify(stem) {
                Some(index) => renamed(format!("Layout_{}_{}", zfill(venue_number, 4), index)),
                None => unclassifiable("没有匹配的布局关键字"),
            },
            Self::Access => renamed(format!("Access_{}_01", leading_facility_id(stem))),
            Self::Entrance => renamed(format!("Entrance_{}_01", leading_facility_id(stem))),
            Self::Product => {
                let (rule, code) = extract_product_code(file_name);
                log::debug!("🏷️ 商品代码规则 {} 命中：{}", rule, file_name);
                renamed(format!("Product_{}_{}", code.letters, zfill(&code.number, 4)))
            }
            Self::Route {
                facility_id,
                route_number,
            } => {
                let n = sequence_or_counter(stem, counter);
                renamed(format!(
                    "Route_{}_{}_{}",
                    zfill(facility_id, 3),
                    route_number,
                    zfill(&n, 2)
                ))
            }
            Self::KeepName => preserve(stem),
        }
    }
}

fn validate_identifier(label: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Usage(format!(
            "{} 只能由数字组成，收到：{:?}",
            label, value
        )));
    }
    Ok(value.to_string())
}

/// 最后一段数字，没有时消耗一个回退序号。
fn sequence_or_counter(stem: &str, counter: &mut SequenceCounter) -> String {
    match last_digit_run(stem) {
        Some(digits) => digits.to_string(),
        None => counter.next_value().to_string(),
    }
}

fn leading_facility_id(stem: &str) -> String {
    zfill(first_digit_run(stem).unwrap_or("000"), 3)
}

fn preserve(stem: &str) -> NamingDecision {
    NamingDecision::PreserveOriginal {
        file_name: format!("{}.webp", stem),
    }
}

fn renamed(stem: String) -> NamingDecision {
    NamingDecision::Renamed {
        file_name: format!("{}.webp", stem),
    }
}

fn unclassifiable(reason: &str) -> NamingDecision {
    NamingDecision::Unclassifiable {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(
        scheme: &NamingScheme,
        file_name: &str,
        counter: &mut SequenceCounter,
    ) -> Option<String> {
        scheme
            .decide(file_name, counter)
            .output_name()
            .map(str::to_string)
    }

    #[test]
    fn facility_uses_trailing_digits_or_counter() {
        let scheme = NamingScheme::facility("7").unwrap();
        let mut counter = SequenceCounter::new();

        assert_eq!(
            name(&scheme, "photo.jpg", &mut counter).as_deref(),
            Some("Facility_007_image_1.webp")
        );
        assert_eq!(
            name(&scheme, "IMG_0042.png", &mut counter).as_deref(),
            Some("Facility_007_image_0042.webp")
        );
        assert_eq!(
            name(&scheme, "lobby.jpg", &mut counter).as_deref(),
            Some("Facility_007_image_2.webp")
        );
        assert_eq!(counter.peek(), 3);
    }

    #[test]
    fn prefix_exemption_wins_and_does_not_consume_counter() {
        let scheme = NamingScheme::facility("7").unwrap();
        let mut counter = SequenceCounter::new();

        let decision = scheme.decide("Facility_123_image_4.png", &mut counter);
        assert_eq!(
            decision,
            NamingDecision::PreserveOriginal {
                file_name: "Facility_123_image_4.webp".to_string()
            }
        );
        assert_eq!(counter.peek(), 1);

        let product = NamingScheme::Product.decide("Product_ABC_0001.jpg", &mut counter);
        assert_eq!(product.output_name(), Some("Product_ABC_0001.webp"));
    }

    #[test]
    fn floor_map_without_digits_is_unclassifiable() {
        let scheme = NamingScheme::floor_map("12").unwrap();
        let mut counter = SequenceCounter::new();

        assert_eq!(
            name(&scheme, "floor_3.png", &mut counter).as_deref(),
            Some("FloorMap_012_a3_1.webp")
        );
        assert!(matches!(
            scheme.decide("overview.png", &mut counter),
            NamingDecision::Unclassifiable { .. }
        ));
    }

    #[test]
    fn layout_uses_keyword_table() {
        let scheme = NamingScheme::layout("35").unwrap();
        let mut counter = SequenceCounter::new();

        assert_eq!(name(&scheme, "シアター.png", &mut counter).as_deref(), Some("Layout_0035_1.webp"));
        assert_eq!(
            name(&scheme, "スクール PJ.png", &mut counter).as_deref(),
            Some("Layout_0035_10.webp")
        );
        assert_eq!(name(&scheme, "photo.png", &mut counter), None);
    }

    #[test]
    fn access_and_entrance_take_leading_digits() {
        let mut counter = SequenceCounter::new();
        assert_eq!(
            name(&NamingScheme::Access, "5_map_2.png", &mut counter).as_deref(),
            Some("Access_005_01.webp")
        );
        assert_eq!(
            name(&NamingScheme::Entrance, "front.jpg", &mut counter).as_deref(),
            Some("Entrance_000_01.webp")
        );
        assert_eq!(counter.peek(), 1);
    }

    #[test]
    fn product_codes_are_zero_padded() {
        let mut counter = SequenceCounter::new();
        assert_eq!(
            name(&NamingScheme::Product, "CTRG-2415.webp", &mut counter).as_deref(),
            Some("Product_CTRG_2415.webp")
        );
        assert_eq!(
            name(&NamingScheme::Product, "abc-7.jpg", &mut counter).as_deref(),
            Some("Product_ABC_0007.webp")
        );
        assert_eq!(
            name(&NamingScheme::Product, "12345.jpg", &mut counter).as_deref(),
            Some("Product_CTRG_12345.webp")
        );
    }

    #[test]
    fn route_pads_sequence_to_two_digits() {
        let scheme = NamingScheme::route("3", "2").unwrap();
        let mut counter = SequenceCounter::new();

        assert_eq!(
            name(&scheme, "step5.jpg", &mut counter).as_deref(),
            Some("Route_003_2_05.webp")
        );
        assert_eq!(
            name(&scheme, "start.jpg", &mut counter).as_deref(),
            Some("Route_003_2_01.webp")
        );
    }

    #[test]
    fn keep_name_only_changes_extension() {
        let mut counter = SequenceCounter::new();
        assert_eq!(
            name(&NamingScheme::KeepName, "hall.v2.JPG", &mut counter).as_deref(),
            Some("hall.v2.webp")
        );
    }

    #[test]
    fn identifiers_must_be_digits() {
        assert!(matches!(NamingScheme::facility("7a"), Err(AppError::Usage(_))));
        assert!(matches!(NamingScheme::layout(""), Err(AppError::Usage(_))));
        assert!(matches!(NamingScheme::route("1", "-2"), Err(AppError::Usage(_))));
        assert!(NamingScheme::route(" 12 ", "3").is_ok());
    }

    #[test]
    fn counter_fallback_names_are_unique() {
        let scheme = NamingScheme::facility("1").unwrap();
        let mut counter = SequenceCounter::new();
        let names: std::collections::HashSet<_> = ["a.jpg", "b.jpg", "c.jpg", "d.jpg"]
            .iter()
            .filter_map(|file| name(&scheme, file, &mut counter))
            .collect();
        assert_eq!(names.len(), 4);
    }
}
