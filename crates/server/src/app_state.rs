use std::sync::Arc;

use db::DBService;
use services::services::auth::AuthService;
use services::services::config::Config;
use services::services::crm::CrmService;
use services::services::email::Mailer;
use services::services::google::GoogleVerifier;
use services::services::meetings::MeetingsService;
use services::services::tasks::TasksService;
use services::services::users::UsersService;
use utils_jwt::JwtService;

/// Everything a request handler needs, cloned per request.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    config: Config,
    jwt: JwtService,
    google: GoogleVerifier,
    mailer: Arc<dyn Mailer>,
    auth: AuthService,
    crm: CrmService,
    tasks: TasksService,
    meetings: MeetingsService,
    users: UsersService,
}

impl AppState {
    pub fn new(db: DBService, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        let jwt = JwtService::new(&config.jwt_secret, config.token_lifetime_secs);
        let google = GoogleVerifier::new(config.google_client_id.clone());
        Self {
            db,
            config,
            jwt,
            google,
            mailer,
            auth: AuthService::new(),
            crm: CrmService::new(),
            tasks: TasksService::new(),
            meetings: MeetingsService::new(),
            users: UsersService::new(),
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn google(&self) -> &GoogleVerifier {
        &self.google
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn crm(&self) -> &CrmService {
        &self.crm
    }

    pub fn tasks(&self) -> &TasksService {
        &self.tasks
    }

    pub fn meetings(&self) -> &MeetingsService {
        &self.meetings
    }

    pub fn users(&self) -> &UsersService {
        &self.users
    }
}
