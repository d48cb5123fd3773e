use crate::error::PortalError;
use crate::r#struct::book::{Book, BOOKS_PER_PARTICIPANT};

pub const SELECTION_ERROR: &str = "يرجى اختيار كتابين فقط لبدء المسابقة";

/// 选书状态，最多同时选中两本
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookSelection {
    selected: Vec<Book>,
}

impl BookSelection {
    pub fn selected(&self) -> &[Book] {
        &self.selected
    }

    /// 已选则取消；未选且不足两本则加入；已满两本时无操作
    pub fn toggle(&mut self, book: Book) {
        if let Some(pos) = self.selected.iter().position(|b| *b == book) {
            self.selected.remove(pos);
        } else if self.selected.len() < BOOKS_PER_PARTICIPANT {
            self.selected.push(book);
        }
    }

    pub fn can_confirm(&self) -> bool {
        self.selected.len() == BOOKS_PER_PARTICIPANT
    }

    /// 恰好两本不同的书时返回按选择顺序排列的书目
    pub fn confirm(&self) -> Result<[Book; 2], PortalError> {
        match self.selected.as_slice() {
            [first, second] if first != second => Ok([*first, *second]),
            _ => Err(PortalError::Validation(SELECTION_ERROR.to_string())),
        }
    }
}
