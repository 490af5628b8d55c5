//! Axiell Arena portal constants
//!
//! Paths, form field names and message prefixes used by the Arena
//! "my account" portlets. These identify page structure, not secrets.

/// Account overview page, relative to the library's base URL
pub const OVERVIEW_PATH: &str = "/protected/my-account/overview";

/// Maximum login POSTs before giving up with a generic login error
pub const LOGIN_ATTEMPTS: u32 = 3;

/// Query parameters addressing the patron login portlet's form submit listener.
pub const LOGIN_QUERY: [(&str, &str); 5] = [
    ("p_p_id", "patronLogin_WAR_arenaportlet"),
    ("p_p_lifecycle", "1"),
    ("p_p_state", "normal"),
    ("p_p_mode", "view"),
    (
        "_patronLogin_WAR_arenaportlet__wu",
        "/patronLogin/?wicket:interface=:1:signInPanel:signInFormPanel:signInForm::IFormSubmitListener::",
    ),
];

/// Hidden anti-forgery field, always submitted empty
pub const FORM_FIELD_HIDDEN: &str = "id__patronLogin__WAR__arenaportlet____3_hf_0";
pub const FORM_FIELD_USERNAME: &str = "openTextUsernameContainer:openTextUsername";
pub const FORM_FIELD_PASSWORD: &str = "textPassword";

/// Feedback text shown when the portal has locked the account
pub const ACCOUNT_LOCKED_PREFIX: &str = "Ditt konto har stängts";

/// Feedback text shown when username or password is wrong
pub const INVALID_CREDENTIALS_PREFIX: &str = "Du blev inte inloggad";
