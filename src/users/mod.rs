pub(crate) mod users_model;
pub(crate) mod users_repository;
pub(crate) mod users_service;

pub use users_model::{NewUser, ProfileWallet, User, UserDB, UserProfile, UserUpdate};
pub use users_repository::UserRepository;
pub use users_service::UserService;
