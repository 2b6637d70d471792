//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod auth_token;
pub mod message;
pub mod rating;
pub mod reaction;
pub mod session;
pub mod setup;
pub mod setup_comment;
pub mod ticket;
pub mod user;

// Re-export specific types to avoid conflicts
pub use auth_token::{Column as AuthTokenColumn, Entity as AuthToken, Model as AuthTokenModel};
pub use message::{Column as MessageColumn, Entity as Message, Model as MessageModel};
pub use rating::{Column as RatingColumn, Entity as Rating, Model as RatingModel};
pub use reaction::{Column as ReactionColumn, Entity as Reaction, Model as ReactionModel};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use setup::{Column as SetupColumn, Entity as Setup, Model as SetupModel};
pub use setup_comment::{
    Column as SetupCommentColumn, Entity as SetupComment, Model as SetupCommentModel,
};
pub use ticket::{Column as TicketColumn, Entity as Ticket, Model as TicketModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
