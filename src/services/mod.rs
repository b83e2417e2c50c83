pub mod auth_service;
pub mod brief_workflow;
pub mod ownership;
pub mod rbac;
pub mod reaction_service;
pub mod storage;
pub mod submission_service;
pub mod upload_service;
