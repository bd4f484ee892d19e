//! Entity operations for companies, jobs and users.
//!
//! Every operation takes `&impl GenericClient`, issues one to three
//! statements, and maps rows into the response structs defined here. Missing
//! rows surface as [`JobError::NotFound`](crate::JobError::NotFound); a search
//! that matches nothing is an empty `Vec`.

pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyDetail, CompanyFilter, CompanyJob, NewCompany};
pub use job::{Job, JobDetail, JobFilter, NewJob};
pub use user::{NewUser, PasswordHasher, User, UserDetail};
