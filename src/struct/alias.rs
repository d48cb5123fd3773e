// 会话ID
pub type SessionId = String;
// 题目ID，按后端返回顺序从1开始编号
pub type QuestionId = u32;
// 后端表格中的分页名
pub type TabName = &'static str;
// 参赛者ID
pub type ParticipantId = String;
