use serde::Serialize;

use crate::error::PortalError;
use crate::profile::ProfileView;
use crate::r#struct::participant::{ParticipantSummary, Status};
use crate::r#struct::request::DashboardQuery;
use crate::traits::gateway::DataGateway;

pub const LOAD_ERROR: &str = "تعذر تحميل بيانات المشاركين. يرجى المحاولة مرة أخرى.";
pub const UNKNOWN_PARTICIPANT: &str = "المشارك غير موجود.";

/// 管理面板，持有一份从后端读取的只读参赛者快照
#[derive(Debug, Default)]
pub struct Dashboard {
    participants: Vec<ParticipantSummary>,
    error: Option<String>,
    selected: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub total: usize,
    pub completed: usize,
    pub error: Option<String>,
    pub participants: Vec<ParticipantRow>,
    pub selected: Option<ProfileView>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRow {
    pub id: String,
    pub full_name: String,
    pub national_id: String,
    pub center: String,
    pub status: Status,
    pub total_score: f64,
}

/// 姓名不区分大小写的子串匹配或身份证号子串匹配，中心精确匹配，书目包含匹配
pub fn matches(participant: &ParticipantSummary, query: &DashboardQuery) -> bool {
    let term = query.search.trim();
    let matches_search = term.is_empty()
        || participant.full_name.to_lowercase().contains(&term.to_lowercase())
        || participant.national_id.contains(term);
    let matches_center = query.center.is_empty() || participant.center == query.center;
    let matches_book = query
        .book
        .map_or(true, |book| participant.selected_books.contains(&book));
    matches_search && matches_center && matches_book
}

impl Dashboard {
    pub async fn load(gateway: &dyn DataGateway) -> Self {
        let mut dashboard = Dashboard::default();
        dashboard.refresh(gateway).await;
        dashboard
    }

    /// 重新读取参赛者，失败时保留旧数据并记录错误
    pub async fn refresh(&mut self, gateway: &dyn DataGateway) {
        match gateway.get_participants().await {
            Ok(participants) => {
                log::info!("读取到{}名参赛者", participants.len());
                self.participants = participants;
                self.error = None;
                if let Some(id) = &self.selected {
                    if !self.participants.iter().any(|p| p.key() == id) {
                        self.selected = None;
                    }
                }
            }
            Err(e) => {
                log::error!("读取参赛者列表失败: {e}");
                self.error = Some(LOAD_ERROR.to_string());
            }
        }
    }

    pub fn select(&mut self, id: &str) -> Result<(), PortalError> {
        if self.participants.iter().any(|p| p.key() == id) {
            self.selected = Some(id.to_string());
            Ok(())
        } else {
            Err(PortalError::Validation(UNKNOWN_PARTICIPANT.to_string()))
        }
    }

    pub fn view(&self, query: &DashboardQuery) -> DashboardView {
        let participants = self
            .participants
            .iter()
            .filter(|p| matches(p, query))
            .map(|p| ParticipantRow {
                id: p.key().to_string(),
                full_name: p.full_name.clone(),
                national_id: p.national_id.clone(),
                center: p.center.clone(),
                status: p.status,
                total_score: p.total_score,
            })
            .collect();
        let selected = self
            .selected
            .as_deref()
            .and_then(|id| self.participants.iter().find(|p| p.key() == id))
            .map(ProfileView::admin);
        DashboardView {
            total: self.participants.len(),
            completed: self.participants.iter().filter(|p| p.status == Status::Completed).count(),
            error: self.error.clone(),
            participants,
            selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r#struct::book::Book;
    use crate::testing::FakeGateway;
    use std::sync::atomic::Ordering;

    fn summary(id: &str, name: &str, national_id: &str, center: &str, books: Vec<Book>, status: Status) -> ParticipantSummary {
        ParticipantSummary {
            id: id.to_string(),
            full_name: name.to_string(),
            national_id: national_id.to_string(),
            center: center.to_string(),
            selected_books: books,
            status,
            ..ParticipantSummary::default()
        }
    }

    fn sample() -> Vec<ParticipantSummary> {
        vec![
            summary("1", "Ahmed Ali Hassan Omar", "29001011111111", "طنطا", vec![Book::ArdAlNifaq, Book::Magdoline], Status::Completed),
            summary("2", "منى سعيد علي محمود", "29102022222222", "زفتي", vec![Book::Tharthara, Book::Magdoline], Status::Pending),
            summary("3", "كريم فتحي عبد الله", "29203033333333", "طنطا", vec![Book::AkherAyam, Book::Tharthara], Status::Completed),
        ]
    }

    fn ids(dashboard: &Dashboard, query: DashboardQuery) -> Vec<String> {
        dashboard.view(&query).participants.into_iter().map(|r| r.id).collect()
    }

    async fn loaded() -> Dashboard {
        let gateway = FakeGateway::with_questions(vec![]);
        *gateway.participants.lock().unwrap() = sample();
        Dashboard::load(gateway.as_ref()).await
    }

    #[tokio::test]
    async fn filters_combine() {
        let dashboard = loaded().await;
        assert_eq!(ids(&dashboard, DashboardQuery::default()), vec!["1", "2", "3"]);
        assert_eq!(
            ids(&dashboard, DashboardQuery { search: "ahmed".to_string(), ..Default::default() }),
            vec!["1"]
        );
        assert_eq!(
            ids(&dashboard, DashboardQuery { search: "2222".to_string(), ..Default::default() }),
            vec!["2"]
        );
        assert_eq!(
            ids(&dashboard, DashboardQuery { center: "طنطا".to_string(), ..Default::default() }),
            vec!["1", "3"]
        );
        assert_eq!(
            ids(
                &dashboard,
                DashboardQuery { center: "طنطا".to_string(), book: Some(Book::Tharthara), ..Default::default() }
            ),
            vec!["3"]
        );
    }

    #[tokio::test]
    async fn counts_and_selection() {
        let mut dashboard = loaded().await;
        let view = dashboard.view(&DashboardQuery::default());
        assert_eq!(view.total, 3);
        assert_eq!(view.completed, 2);
        assert!(view.selected.is_none());

        assert!(dashboard.select("9").is_err());
        dashboard.select("2").unwrap();
        let selected = dashboard.view(&DashboardQuery::default()).selected.unwrap();
        assert_eq!(selected.full_name, "منى سعيد علي محمود");
    }

    #[tokio::test]
    async fn fetch_failure_is_kept_for_retry() {
        let gateway = FakeGateway::with_questions(vec![]);
        gateway.set_offline(true);
        let mut dashboard = Dashboard::load(gateway.as_ref()).await;
        assert_eq!(dashboard.view(&DashboardQuery::default()).error.as_deref(), Some(LOAD_ERROR));

        gateway.set_offline(false);
        *gateway.participants.lock().unwrap() = sample();
        dashboard.refresh(gateway.as_ref()).await;
        assert_eq!(gateway.participant_calls.load(Ordering::SeqCst), 2);
        let view = dashboard.view(&DashboardQuery::default());
        assert!(view.error.is_none());
        assert_eq!(view.total, 3);
    }
}
