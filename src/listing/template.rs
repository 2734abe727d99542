use super::Language;
use crate::product::ProductRecord;

const EN_BULLETS: [&str; 5] = [
    "High-quality materials ensure product durability and reliability",
    "Innovative design provides superior user experience and convenience",
    "Multi-functional features meet diverse usage requirements",
    "Easy to operate and maintain, saving time and effort",
    "Professional certification, safe and reliable, quality guaranteed",
];

const ZH_BULLETS: [&str; 5] = [
    "高品质材料制造，确保产品耐用性和可靠性",
    "创新设计，提供卓越的用户体验和便利性",
    "多功能特性，满足多样化的使用需求",
    "易于操作和维护，节省时间和精力",
    "专业认证，安全可靠，品质保证",
];

fn non_empty_or<'a>(s: &'a str, default: &'a str) -> &'a str {
    let s = s.trim();
    if s.is_empty() { default } else { s }
}

pub fn title(record: &ProductRecord, language: Language) -> String {
    match language {
        Language::English => format!(
            "Premium {} - Enhanced Version with Advanced Features, High Quality {} Official Product",
            non_empty_or(&record.title, "Product"),
            non_empty_or(&record.brand, "Brand"),
        ),
        Language::Chinese => {
            let lead = record.title.split_whitespace().next().unwrap_or("商品");
            format!("【升级版】{} - 高品质，功能强大，{}官方正品", lead, non_empty_or(&record.brand, "品牌"))
        }
    }
}

pub fn bullets(language: Language, count: usize) -> Vec<String> {
    let base = match language {
        Language::English => &EN_BULLETS,
        Language::Chinese => &ZH_BULLETS,
    };
    base.iter().take(count).map(|s| s.to_string()).collect()
}

pub fn description(record: &ProductRecord, language: Language) -> String {
    match language {
        Language::English => format!(
            "Product Overview:\n{}\n\n\
             Key Features:\n\
             • Made with premium materials to ensure long-term reliability\n\
             • Enhanced with innovative technology for superior performance compared to similar products\n\
             • Ergonomic design for comfortable and convenient operation\n\
             • Multi-functional design suitable for various usage scenarios\n\
             • Passed strict quality inspections, safe and reliable\n\n\
             Target Users:\n\
             {} is suitable for users who demand high quality and can perform excellently in both daily use and professional settings.",
            non_empty_or(
                &record.description,
                "This high-quality product combines advanced technology with user-centric design to deliver an exceptional user experience."
            ),
            non_empty_or(&record.brand, "This product"),
        ),
        Language::Chinese => format!(
            "产品概述:\n{}\n\n\
             核心特点:\n\
             • 采用优质材料制造，确保长期使用的可靠性\n\
             • 创新技术加持，性能表现优于同类产品\n\
             • 人体工学设计，操作舒适便捷\n\
             • 多功能性设计，适应多种使用场景\n\
             • 通过严格质量检测，安全可靠\n\n\
             适用人群:\n\
             {}适用于对品质有高要求的用户，无论是日常使用还是专业场合都能表现出色。",
            non_empty_or(&record.description, "这款高品质产品结合了先进技术与人性化设计，为用户提供卓越的使用体验。"),
            non_empty_or(&record.brand, "本产品"),
        ),
    }
}
