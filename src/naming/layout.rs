//! 会场布局图关键字分类
//!
//! # 设计思路
//!
//! 布局图文件名通常是日文描述（如 `スクール形式 PJ有り.png`），需要映射到固定的布局序号。
//! 分类表 `LAYOUT_RULES` 是有序数组：带投影仪的组合规则必须排在对应的简单规则之前，
//! 否则 `スクール + PJ` 会被 `スクール` 提前吃掉。
//!
//! # 实现思路
//!
//! - 先去掉所有空白（半角、全角 U+3000）与零宽字符，再做子串匹配。
//! - 投影仪检测兼容 NFD 文件名（macOS 会把 `プ` 拆成 `フ` + 半浊音符）。

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\x{3000}\x{200B}\x{200C}\x{200D}\x{FEFF}]+").unwrap());

const SCHOOL: &[&str] = &["スクール"];
const THEATER: &[&str] = &["シアター"];
const ISLAND: &[&str] = &["島形", "島型"];
const T_ISLAND: &[&str] = &["T字島型", "T字島", "T字島形", "T島型"];
const KO_SHAPE: &[&str] = &["コノ字", "コの字", "こノ字", "この字"];
const RO_SHAPE: &[&str] = &["ロノ字", "ロの字"];
const SEATED: &[&str] = &["正餐", "着席"];
const STANDING: &[&str] = &["立食"];

/// `プロジェクター` 在 NFD 下残留的基础假名。
const PROJECTOR_FRAGMENTS: &[&str] = &["フ", "ロ", "シ", "ェ", "ク", "タ"];

/// 一条分类规则：命中任一关键字（且按需要求投影仪）即得到 `index`。
#[derive(Debug, Clone, Copy)]
pub struct LayoutRule {
    pub keywords: &'static [&'static str],
    pub requires_projector: bool,
    pub index: u8,
}

const fn rule(
    keywords: &'static [&'static str],
    requires_projector: bool,
    index: u8,
) -> LayoutRule {
    LayoutRule {
        keywords,
        requires_projector,
        index,
    }
}

/// 布局分类表，自上而下，第一条命中即返回。
pub const LAYOUT_RULES: &[LayoutRule] = &[
    rule(SCHOOL, true, 10),
    rule(KO_SHAPE, true, 13),
    rule(T_ISLAND, true, 12),
    rule(THEATER, true, 9),
    rule(ISLAND, true, 11),
    rule(T_ISLAND, false, 4),
    rule(KO_SHAPE, false, 8),
    rule(RO_SHAPE, false, 5),
    rule(SEATED, false, 6),
    rule(STANDING, false, 7),
    rule(SCHOOL, false, 2),
    rule(THEATER, false, 1),
    rule(ISLAND, false, 3),
];

type ProjectorPredicate = fn(&str, &str) -> bool;

/// 投影仪检测：任一条成立即视为“有投影仪”。参数为（原文, 小写）。
const PROJECTOR_PREDICATES: &[ProjectorPredicate] = &[
    |name, _| name.contains("プロジェクタ"),
    |name, _| contains_all(name, PROJECTOR_FRAGMENTS),
    |name, _| name.contains("スクプロ"),
    |name, _| name.contains("スク") && contains_all(name, &["フ", "ロ"]),
    |_, lower| lower.contains("projector"),
    |_, lower| lower.contains("pj"),
    |name, _| name.contains('有') && contains_any(name, PROJECTOR_FRAGMENTS),
];

fn contains_all(name: &str, needles: &[&str]) -> bool {
    needles.iter().all(|needle| name.contains(needle))
}

fn contains_any(name: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| name.contains(needle))
}

/// 去掉所有空白与零宽字符。
pub fn strip_whitespace(name: &str) -> String {
    WHITESPACE.replace_all(name, "").into_owned()
}

/// 文件名是否表示“有投影仪”（调用方需先去空白）。
pub fn has_projector(compact: &str) -> bool {
    let lower = compact.to_lowercase();
    PROJECTOR_PREDICATES
        .iter()
        .any(|predicate| predicate(compact, &lower))
}

/// 按分类表返回命中的规则。
pub fn classify_rule(stem: &str) -> Option<&'static LayoutRule> {
    let compact = strip_whitespace(stem);
    let projector = has_projector(&compact);

    LAYOUT_RULES.iter().find(|rule| {
        (!rule.requires_projector || projector) && contains_any(&compact, rule.keywords)
    })
}

/// 按分类表返回布局序号，不匹配任何规则时返回 `None`。
pub fn classify(stem: &str) -> Option<u8> {
    classify_rule(stem).map(|rule| rule.index)
}
