pub mod gateway;
pub mod grader;

use std::sync::Arc;

use gateway::DataGateway;
use grader::EssayGrader;

/// 每个会话共享的外部协作方
#[derive(Clone)]
pub struct Backends {
    pub gateway: Arc<dyn DataGateway>,
    pub grader: Arc<dyn EssayGrader>,
}
