use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::session::SessionUser;

/// Page
///
/// Every page the portal serves. Dynamic segments (group and post ids) are kept
/// as the raw path text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
#[ts(export)]
pub enum Page {
    Home,
    Login,
    Register,
    RecoverPassword,
    ResetPassword,
    Assessment,
    Dashboard,
    Chat,
    Groups,
    Group(String),
    Posts,
    Post(String),
    Activities,
    Profile,
    ChangePassword,
}

/// NavSection
///
/// Entries of the dashboard header. Exactly one is highlighted per dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum NavSection {
    Home,
    Chat,
    Groups,
    Posts,
    Activities,
    Profile,
}

impl Page {
    /// from_path
    ///
    /// Parses a request path. A single trailing slash is ignored; anything unknown,
    /// including empty ids, is `None`.
    pub fn from_path(path: &str) -> Option<Page> {
        let trimmed = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        let page = match segments.as_slice() {
            [""] => Page::Home,
            ["login"] => Page::Login,
            ["register"] => Page::Register,
            ["recover-password"] => Page::RecoverPassword,
            ["reset-password"] => Page::ResetPassword,
            ["test"] => Page::Assessment,
            ["dashboard"] => Page::Dashboard,
            ["dashboard", "chat"] => Page::Chat,
            ["dashboard", "groups"] => Page::Groups,
            ["dashboard", "groups", id] if !id.is_empty() => Page::Group(id.to_string()),
            ["dashboard", "posts"] => Page::Posts,
            ["dashboard", "posts", id] if !id.is_empty() => Page::Post(id.to_string()),
            ["dashboard", "activities"] => Page::Activities,
            ["dashboard", "profile"] => Page::Profile,
            ["dashboard", "profile", "change-password"] => Page::ChangePassword,
            _ => return None,
        };
        Some(page)
    }

    pub fn path(&self) -> String {
        match self {
            Page::Home => "/".to_string(),
            Page::Login => "/login".to_string(),
            Page::Register => "/register".to_string(),
            Page::RecoverPassword => "/recover-password".to_string(),
            Page::ResetPassword => "/reset-password".to_string(),
            Page::Assessment => "/test".to_string(),
            Page::Dashboard => "/dashboard".to_string(),
            Page::Chat => "/dashboard/chat".to_string(),
            Page::Groups => "/dashboard/groups".to_string(),
            Page::Group(id) => format!("/dashboard/groups/{id}"),
            Page::Posts => "/dashboard/posts".to_string(),
            Page::Post(id) => format!("/dashboard/posts/{id}"),
            Page::Activities => "/dashboard/activities".to_string(),
            Page::Profile => "/dashboard/profile".to_string(),
            Page::ChangePassword => "/dashboard/profile/change-password".to_string(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Welcome",
            Page::Login => "Sign in",
            Page::Register => "Create account",
            Page::RecoverPassword => "Recover password",
            Page::ResetPassword => "Reset password",
            Page::Assessment => "Initial anxiety assessment",
            Page::Dashboard => "Dashboard",
            Page::Chat => "Chat",
            Page::Groups => "Support groups",
            Page::Group(_) => "Group",
            Page::Posts => "Experiences",
            Page::Post(_) => "Experience",
            Page::Activities => "Activities",
            Page::Profile => "Profile",
            Page::ChangePassword => "Change password",
        }
    }

    /// The header entry highlighted on this page; `None` outside the dashboard.
    pub fn nav_section(&self) -> Option<NavSection> {
        match self {
            Page::Dashboard => Some(NavSection::Home),
            Page::Chat => Some(NavSection::Chat),
            Page::Groups | Page::Group(_) => Some(NavSection::Groups),
            Page::Posts | Page::Post(_) => Some(NavSection::Posts),
            Page::Activities => Some(NavSection::Activities),
            Page::Profile | Page::ChangePassword => Some(NavSection::Profile),
            Page::Home
            | Page::Login
            | Page::Register
            | Page::RecoverPassword
            | Page::ResetPassword
            | Page::Assessment => None,
        }
    }
}

/// PageView
///
/// What a page handler returns once the access gate let the request through: which
/// page it is, its header state and who is signed in. Markup is rendered elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageView {
    pub page: Page,
    pub title: String,
    pub path: String,
    pub active_section: Option<NavSection>,
    pub user: Option<SessionUser>,
}

impl PageView {
    pub fn new(page: Page, user: Option<SessionUser>) -> Self {
        Self {
            title: page.title().to_string(),
            path: page.path(),
            active_section: page.nav_section(),
            page,
            user,
        }
    }
}
