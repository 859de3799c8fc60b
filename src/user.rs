//! User account database lookup.
//!
//! Reads the passwd entry for the current user. Every accessor fails
//! soft: a missing entry or a null field is reported as `None`, never
//! as an error.

use serde::Serialize;

/// A snapshot of the current user's account record.
///
/// # Example
///
/// ```
/// use loginenv::user::UserRecord;
///
/// // None when the account database has no entry for this user
/// if let Some(record) = UserRecord::current() {
///     println!("{:?}", record.shell);
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    /// Login shell (`pw_shell`).
    pub shell: Option<String>,
    /// Account name (`pw_name`).
    pub name: Option<String>,
    /// Home directory (`pw_dir`).
    pub home_dir: Option<String>,
}

impl UserRecord {
    /// Read the account record for the current real user ID.
    pub fn current() -> Option<Self> {
        #[cfg(unix)]
        {
            // SAFETY: getuid() is a simple syscall that cannot fail
            sys::lookup(unsafe { libc::getuid() })
        }

        #[cfg(not(unix))]
        {
            None
        }
    }
}

/// Source of account information used by the resolvers.
///
/// [`SystemAccounts`] queries the OS; fixed records can stand in for it
/// when the resolution logic is exercised on its own.
pub trait AccountDatabase {
    /// The user's login shell.
    fn shell(&self) -> Option<String>;

    /// The user's account name.
    fn user_name(&self) -> Option<String>;

    /// The user's home directory.
    fn home_dir(&self) -> Option<String>;

    /// The current user name as reported intrinsically by the platform.
    ///
    /// `None` means the platform has no such primitive.
    fn intrinsic_user_name(&self) -> Option<String> {
        None
    }
}

/// The live OS account database. Every call performs a fresh lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAccounts;

impl AccountDatabase for SystemAccounts {
    fn shell(&self) -> Option<String> {
        UserRecord::current().and_then(|r| r.shell)
    }

    fn user_name(&self) -> Option<String> {
        UserRecord::current().and_then(|r| r.name)
    }

    fn home_dir(&self) -> Option<String> {
        UserRecord::current().and_then(|r| r.home_dir)
    }

    fn intrinsic_user_name(&self) -> Option<String> {
        #[cfg(target_os = "macos")]
        {
            // SAFETY: geteuid() is a simple syscall that cannot fail
            sys::lookup(unsafe { libc::geteuid() }).and_then(|r| r.name)
        }

        #[cfg(not(target_os = "macos"))]
        {
            None
        }
    }
}

impl AccountDatabase for UserRecord {
    fn shell(&self) -> Option<String> {
        self.shell.clone()
    }

    fn user_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn home_dir(&self) -> Option<String> {
        self.home_dir.clone()
    }
}

#[cfg(unix)]
mod sys {
    use super::UserRecord;
    use std::ffi::CStr;

    const FALLBACK_BUFFER_LEN: usize = 1024;
    const MAX_BUFFER_LEN: usize = 1 << 20;

    pub(super) fn lookup(uid: libc::uid_t) -> Option<UserRecord> {
        // SAFETY: sysconf only reads a configuration value
        let suggested = unsafe { libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX) };
        let mut buf_len = if suggested > 0 {
            suggested as usize
        } else {
            FALLBACK_BUFFER_LEN
        };

        loop {
            let mut buf: Vec<libc::c_char> = vec![0; buf_len];
            // SAFETY: passwd is a plain C struct; all-zero is a valid value
            let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::passwd = std::ptr::null_mut();

            // SAFETY: every pointer refers to live storage owned by this
            // frame, and buf.len() is the true length of buf
            let rc = unsafe {
                libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
            };

            if rc == libc::ERANGE && buf_len < MAX_BUFFER_LEN {
                buf_len *= 2;
                continue;
            }

            if rc != 0 || result.is_null() {
                tracing::debug!("No passwd entry for uid {} (rc = {})", uid, rc);
                return None;
            }

            // SAFETY: on success the pw_* fields are null or point into buf,
            // which outlives these reads
            return Some(unsafe {
                UserRecord {
                    shell: field(pwd.pw_shell),
                    name: field(pwd.pw_name),
                    home_dir: field(pwd.pw_dir),
                }
            });
        }
    }

    unsafe fn field(ptr: *const libc::c_char) -> Option<String> {
        if ptr.is_null() {
            None
        } else {
            Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
        }
    }
}
