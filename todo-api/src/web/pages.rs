/// Page rendering for the web surface
///
/// Templates are compiled into the binary and parsed once at startup. Every
/// page extends `layout.html`, which shows the optional `msg` banner and the
/// navigation for the signed-in `user`.

use serde::Serialize;
use tera::{Context, Tera};
use todo_shared::{auth::jwt::Identity, models::Todo};

const TEMPLATES: [(&str, &str); 6] = [
    ("layout.html", include_str!("../../templates/layout.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("register.html", include_str!("../../templates/register.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("add-todo.html", include_str!("../../templates/add-todo.html")),
    ("edit-todo.html", include_str!("../../templates/edit-todo.html")),
];

/// Data every page can use
#[derive(Debug, Default, Serialize)]
struct PageContext<'a> {
    user: Option<&'a Identity>,
    msg: Option<&'a str>,
}

/// Compiled page templates
pub struct Pages {
    tera: Tera,
}

impl Pages {
    /// Parses the embedded templates
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    fn render(&self, name: &str, page: PageContext<'_>, extra: Context) -> Result<String, tera::Error> {
        let mut context = Context::from_serialize(page)?;
        context.extend(extra);
        self.tera.render(name, &context)
    }

    pub fn login(&self, msg: Option<&str>) -> Result<String, tera::Error> {
        self.render("login.html", PageContext { user: None, msg }, Context::new())
    }

    pub fn register(&self, msg: Option<&str>) -> Result<String, tera::Error> {
        self.render("register.html", PageContext { user: None, msg }, Context::new())
    }

    /// The signed-in user's todo list
    pub fn home(&self, user: &Identity, todos: &[Todo]) -> Result<String, tera::Error> {
        let mut extra = Context::new();
        extra.insert("todos", todos);
        self.render("home.html", PageContext { user: Some(user), msg: None }, extra)
    }

    pub fn add_todo(&self, user: &Identity, msg: Option<&str>) -> Result<String, tera::Error> {
        self.render("add-todo.html", PageContext { user: Some(user), msg }, Context::new())
    }

    pub fn edit_todo(
        &self,
        user: &Identity,
        todo: &Todo,
        msg: Option<&str>,
    ) -> Result<String, tera::Error> {
        let mut extra = Context::new();
        extra.insert("todo", todo);
        self.render("edit-todo.html", PageContext { user: Some(user), msg }, extra)
    }
}
