//! Navigation and the logged-in user.
//!
//! The shell is the only owner of session state: which user is signed in,
//! which view is showing, the course tab and the live quiz attempt. Anything
//! worth keeping across restarts goes through a [`KeyValueStore`]; store
//! failures are logged and never block navigation.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::content::Topic;
use crate::quiz::QuizAttempt;
use crate::store::KeyValueStore;
use crate::validate::{FieldErrors, LoginForm, User};

pub const USER_KEY: &str = "user";
pub const TAB_KEY: &str = "waves-course-tab";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Dashboard,
    WavesCourse,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Dashboard => "/dashboard",
            Route::WavesCourse => "/waves-course",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            "/waves-course" => Some(Route::WavesCourse),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseTab {
    #[default]
    Content,
    Quiz,
}

impl CourseTab {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseTab::Content => "content",
            CourseTab::Quiz => "quiz",
        }
    }

    /// Unknown values fall back to the content tab.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "quiz" => CourseTab::Quiz,
            _ => CourseTab::Content,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourseCard {
    pub title: &'static str,
    pub summary: &'static str,
    pub icon: &'static str,
    /// `None` while the course is not open yet.
    pub route: Option<Route>,
    pub progress_percent: u8,
}

pub static COURSES: [CourseCard; 2] = [
    CourseCard {
        title: "Waves Course",
        summary: "Learn wave properties with simulations, key ideas, and quizzes.",
        icon: "🌊",
        route: Some(Route::WavesCourse),
        progress_percent: 0,
    },
    CourseCard {
        title: "Atomic Structure",
        summary: "Coming soon - Interactive atomic models and electron configurations",
        icon: "⚛️",
        route: None,
        progress_percent: 0,
    },
];

pub struct Shell<S: KeyValueStore> {
    store: S,
    user: Option<User>,
    route: Route,
    tab: CourseTab,
    topic: Topic,
    quiz: QuizAttempt,
}

impl<S: KeyValueStore> Shell<S> {
    /// Restore the user and course tab from the store, if present.
    pub fn new(store: S) -> Self {
        let user = store.get(USER_KEY).and_then(|raw| {
            serde_json::from_str::<User>(&raw)
                .map_err(|e| warn!("discarding unreadable saved user: {}", e))
                .ok()
        });
        let tab = store
            .get(TAB_KEY)
            .map(|s| CourseTab::parse_or_default(&s))
            .unwrap_or_default();
        let route = if user.is_some() { Route::Dashboard } else { Route::Login };
        if let Some(u) = &user {
            info!("restored session for {}", u.name);
        }
        Self {
            store,
            user,
            route,
            tab,
            topic: Topic::default(),
            quiz: QuizAttempt::new(),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Where a request for `wanted` actually lands.
    pub fn resolve(&self, wanted: Option<Route>) -> Route {
        match (self.user.is_some(), wanted) {
            (true, Some(Route::Login)) | (true, None) => Route::Dashboard,
            (true, Some(r)) => r,
            (false, _) => Route::Login,
        }
    }

    pub fn navigate(&mut self, wanted: Option<Route>) -> Route {
        let to = self.resolve(wanted);
        if to == Route::WavesCourse && self.route != Route::WavesCourse {
            self.enter_course();
        }
        self.route = to;
        to
    }

    pub fn navigate_path(&mut self, path: &str) -> Route {
        self.navigate(Route::from_path(path))
    }

    /// Validate the form; on success persist the user and go to the
    /// dashboard. On failure nothing changes.
    pub fn login(&mut self, form: &LoginForm) -> Result<&User, FieldErrors> {
        let user = form.submit()?;
        match serde_json::to_string(&user) {
            Ok(json) => {
                if let Err(e) = self.store.set(USER_KEY, &json) {
                    warn!("could not persist user: {}", e);
                }
            }
            Err(e) => warn!("could not encode user: {}", e),
        }
        info!("signed in as {}", user.name);
        self.route = Route::Dashboard;
        Ok(&*self.user.insert(user))
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.store.remove(USER_KEY) {
            warn!("could not clear saved user: {}", e);
        }
        if let Some(u) = self.user.take() {
            info!("signed out {}", u.name);
        }
        self.quiz.retake();
        self.route = Route::Login;
    }

    /// Dashboard catalogue, only for a signed-in user.
    pub fn courses(&self) -> Option<&'static [CourseCard]> {
        self.user.as_ref().map(|_| &COURSES[..])
    }

    pub fn tab(&self) -> CourseTab {
        self.tab
    }

    /// Switch course tab and remember it. Coming over from the content tab
    /// starts a fresh attempt; re-selecting the quiz keeps it.
    pub fn set_tab(&mut self, tab: CourseTab) {
        if tab == CourseTab::Quiz && self.tab != CourseTab::Quiz {
            self.quiz.retake();
        }
        self.tab = tab;
        if let Err(e) = self.store.set(TAB_KEY, tab.as_str()) {
            warn!("could not persist course tab: {}", e);
        }
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn set_topic(&mut self, topic: Topic) {
        self.topic = topic;
    }

    pub fn quiz(&self) -> &QuizAttempt {
        &self.quiz
    }

    pub fn quiz_mut(&mut self) -> &mut QuizAttempt {
        &mut self.quiz
    }

    fn enter_course(&mut self) {
        self.topic = Topic::default();
        if self.tab == CourseTab::Quiz {
            self.quiz.retake();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::QUESTIONS;
    use crate::store::{MemoryStore, StoreError};

    fn signed_in() -> Shell<MemoryStore> {
        let mut shell = Shell::new(MemoryStore::new());
        shell.login(&LoginForm::new("user@test.com", "Passw0rd")).unwrap();
        shell
    }

    #[test]
    fn anonymous_users_are_sent_to_login() {
        let mut shell = Shell::new(MemoryStore::new());
        assert_eq!(shell.route(), Route::Login);
        assert_eq!(shell.navigate(Some(Route::Dashboard)), Route::Login);
        assert_eq!(shell.navigate_path("/waves-course"), Route::Login);
        assert!(shell.courses().is_none());
    }

    #[test]
    fn login_goes_to_dashboard_and_persists() {
        let shell = signed_in();
        assert_eq!(shell.route(), Route::Dashboard);
        assert_eq!(shell.user().unwrap().name, "user");
        let saved = shell.store().get(USER_KEY).unwrap();
        assert_eq!(serde_json::from_str::<User>(&saved).unwrap().name, "user");
    }

    #[test]
    fn failed_login_changes_nothing() {
        let mut shell = Shell::new(MemoryStore::new());
        let err = shell.login(&LoginForm::new("bad", "Passw0rd")).unwrap_err();
        assert!(err.email.is_some());
        assert_eq!(shell.route(), Route::Login);
        assert!(shell.user().is_none());
        assert!(shell.store().get(USER_KEY).is_none());
    }

    #[test]
    fn signed_in_routing() {
        let mut shell = signed_in();
        assert_eq!(shell.navigate(Some(Route::Login)), Route::Dashboard);
        assert_eq!(shell.navigate_path("/nowhere"), Route::Dashboard);
        assert_eq!(shell.navigate_path("/waves-course"), Route::WavesCourse);
        assert_eq!(shell.courses().unwrap().len(), 2);
    }

    #[test]
    fn session_restores_from_store() {
        let mut store = MemoryStore::new();
        store.set(USER_KEY, r#"{"email":"a@b.c","name":"a"}"#).unwrap();
        store.set(TAB_KEY, "quiz").unwrap();
        let shell = Shell::new(store);
        assert_eq!(shell.route(), Route::Dashboard);
        assert_eq!(shell.tab(), CourseTab::Quiz);
    }

    #[test]
    fn garbage_in_store_is_ignored() {
        let mut store = MemoryStore::new();
        store.set(USER_KEY, "{").unwrap();
        store.set(TAB_KEY, "settings").unwrap();
        let shell = Shell::new(store);
        assert!(shell.user().is_none());
        assert_eq!(shell.tab(), CourseTab::Content);
    }

    #[test]
    fn logout_clears_user() {
        let mut shell = signed_in();
        shell.logout();
        assert_eq!(shell.route(), Route::Login);
        assert!(shell.store().get(USER_KEY).is_none());
    }

    #[test]
    fn entering_quiz_tab_resets_attempt() {
        let mut shell = signed_in();
        shell.navigate(Some(Route::WavesCourse));
        shell.set_tab(CourseTab::Quiz);
        for q in &QUESTIONS {
            shell.quiz_mut().select_answer(q.id, 0).unwrap();
        }
        shell.quiz_mut().submit().unwrap();
        shell.set_tab(CourseTab::Content);
        shell.set_tab(CourseTab::Quiz);
        assert_eq!(shell.quiz().answered_count(), 0);
        assert!(!shell.quiz().is_submitted());
        assert_eq!(shell.store().get(TAB_KEY).as_deref(), Some("quiz"));
    }

    #[test]
    fn reselecting_quiz_tab_keeps_answers() {
        let mut shell = signed_in();
        shell.navigate(Some(Route::WavesCourse));
        shell.set_tab(CourseTab::Quiz);
        shell.quiz_mut().select_answer(QUESTIONS[0].id, 1).unwrap();
        shell.set_tab(CourseTab::Quiz);
        assert_eq!(shell.quiz().answered_count(), 1);
        assert_eq!(shell.quiz().answer(QUESTIONS[0].id), Some(1));
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: key.into(),
                source: std::io::Error::other("read-only"),
            })
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.set(key, "")
        }
    }

    #[test]
    fn store_failures_do_not_block_navigation() {
        let mut shell = Shell::new(FailingStore);
        shell.login(&LoginForm::new("user@test.com", "Passw0rd")).unwrap();
        assert_eq!(shell.route(), Route::Dashboard);
        shell.set_tab(CourseTab::Quiz);
        assert_eq!(shell.tab(), CourseTab::Quiz);
        shell.logout();
        assert_eq!(shell.route(), Route::Login);
    }
}
