use actix_web::HttpResponse;
use serde::Serialize;

use crate::r#struct::alias::TabName;
use crate::r#struct::book::{Book, BOOKS, CENTERS, QUESTIONS_PER_BOOK, QUIZ_TIMER_SECONDS};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct BookEntry {
    book: Book,
    tab: TabName,
    questions: usize,
    seconds_per_question: u64,
}

pub(crate) async fn books() -> HttpResponse {
    let entries: Vec<BookEntry> = BOOKS
        .iter()
        .map(|book| BookEntry {
            book: *book,
            tab: book.tab(),
            questions: QUESTIONS_PER_BOOK,
            seconds_per_question: QUIZ_TIMER_SECONDS,
        })
        .collect();
    HttpResponse::Ok().json(entries)
}

pub(crate) async fn centers() -> HttpResponse {
    HttpResponse::Ok().json(CENTERS)
}
