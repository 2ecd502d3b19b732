use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("caller {0} is not an administrator")]
    NotAdmin(String),

    #[error("{0} is already an administrator or has a pending proposal")]
    AlreadyAdmin(String),

    #[error("caller {0} has no pending administrator proposal")]
    NotProposedAdmin(String),

    #[error("cannot remove the last administrator")]
    CannotRemoveLastAdmin,
}
