pub mod category;
pub mod category_type;
pub mod experience;
pub mod language;
pub mod permission;
pub mod portfolio;
pub mod project;
pub mod role;
pub mod section;
pub mod skill;
pub mod text;
pub mod translation;
pub mod user;

pub use category::{Category, CategoryCreate, CategoryRef, CategoryUpdate};
pub use category_type::{CategoryType, CategoryTypeCreate, CategoryTypeUpdate};
pub use experience::{Experience, ExperienceCreate, ExperienceRef, ExperienceUpdate};
pub use language::{Language, LanguageCreate, LanguageUpdate};
pub use permission::{Permission, PermissionCreate, PermissionRef, PermissionUpdate};
pub use portfolio::{Portfolio, PortfolioCreate, PortfolioUpdate};
pub use project::{AttachmentInput, AttachmentOut, Project, ProjectCreate, ProjectRef, ProjectUpdate};
pub use role::{Role, RoleCreate, RoleRef, RoleUpdate};
pub use section::{Section, SectionCreate, SectionRef, SectionUpdate};
pub use skill::{Skill, SkillCreate, SkillNameCheck, SkillRef, SkillUpdate};
pub use text::{ImageInput, ImageOut, LanguageRef, LocalizedTextOut, NamedSummary, SectionTextInput, TextInput};
pub use translation::{Translation, TranslationCreate, TranslationUpdate};
pub use user::{PasswordChange, User, UserCreate, UserUpdate};
