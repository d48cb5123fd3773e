use std::fmt;

use serde::{Deserialize, Serialize};

use crate::r#struct::alias::TabName;

/// 每道选择题的作答时间
pub const QUIZ_TIMER_SECONDS: u64 = 25;
/// 每本书的题目数量，仅用于展示
pub const QUESTIONS_PER_BOOK: usize = 40;
/// 参赛者需要选择的书籍数量
pub const BOOKS_PER_PARTICIPANT: usize = 2;
/// 满分：两本书各100分选择题加50分作文
pub const MAX_TOTAL_SCORE: f64 = 300.0;

/// 比赛书目，进程生命周期内不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Book {
    #[serde(rename = "أرض النفاق", alias = "land_hypocrisy")]
    ArdAlNifaq,
    #[serde(rename = "ثرثرة فوق النيل", alias = "nile_chitchat")]
    Tharthara,
    #[serde(rename = "ماجدولين", alias = "madoline")]
    Magdoline,
    #[serde(rename = "آخر أيام نوفمبر", alias = "november_days")]
    AkherAyam,
}

pub const BOOKS: [Book; 4] = [
    Book::ArdAlNifaq,
    Book::Tharthara,
    Book::Magdoline,
    Book::AkherAyam,
];

impl Book {
    pub fn title(&self) -> &'static str {
        match self {
            Book::ArdAlNifaq => "أرض النفاق",
            Book::Tharthara => "ثرثرة فوق النيل",
            Book::Magdoline => "ماجدولين",
            Book::AkherAyam => "آخر أيام نوفمبر",
        }
    }

    /// 按标题或分页名识别书目，忽略首尾空白
    pub fn parse(label: &str) -> Option<Book> {
        let label = label.trim();
        BOOKS.into_iter().find(|book| book.title() == label || book.tab() == label)
    }

    /// 书目对应的后端表格分页
    pub fn tab(&self) -> TabName {
        match self {
            Book::ArdAlNifaq => "land_hypocrisy",
            Book::Tharthara => "nile_chitchat",
            Book::Magdoline => "madoline",
            Book::AkherAyam => "november_days",
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

// 参赛者所属的行政中心
pub const CENTERS: [&str; 8] = [
    "السنطه",
    "المحلة الكبري",
    "بسيون",
    "سمنود",
    "زفتي",
    "طنطا",
    "قطور",
    "كفرالزيات",
];

pub fn is_known_center(center: &str) -> bool {
    CENTERS.contains(&center)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_serializes_as_title() {
        let json = serde_json::to_string(&Book::Magdoline).unwrap();
        assert_eq!(json, "\"ماجدولين\"");
    }

    #[test]
    fn parse_trims_and_rejects_unknown_titles() {
        assert_eq!(Book::parse(" ماجدولين "), Some(Book::Magdoline));
        assert_eq!(Book::parse("november_days"), Some(Book::AkherAyam));
        assert_eq!(Book::parse("كتاب آخر"), None);
    }

    #[test]
    fn book_accepts_tab_name() {
        let book: Book = serde_json::from_str("\"nile_chitchat\"").unwrap();
        assert_eq!(book, Book::Tharthara);
        let book: Book = serde_json::from_str("\"آخر أيام نوفمبر\"").unwrap();
        assert_eq!(book, Book::AkherAyam);
    }

    #[test]
    fn every_book_has_distinct_tab() {
        let mut tabs: Vec<_> = BOOKS.iter().map(|b| b.tab()).collect();
        tabs.sort();
        tabs.dedup();
        assert_eq!(tabs.len(), BOOKS.len());
    }
}
