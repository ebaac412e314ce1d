//! Error-id catalog shared with the daemon
//!
//! Error ids are grouped in hex ranges by subsystem: 0x1xxx module database,
//! 0x2xxx database manager, 0x3xxx session layer, 0x4xxx RPC layer,
//! 0x5xxx authd, 0x7xxx module dispatch.

/// OK, no error
pub const ERR_OK: u32 = 0x0000;
/// Unknown error
pub const ERR_UNKNOWN: u32 = 0x0001;

/// Unknown class
pub const ERR_MDB_UNKNOWN_CLASS: u32 = 0x1001;
/// Action failed in module
pub const ERR_MDB_ACTION_FAILED: u32 = 0x1002;
/// Invalid module return
pub const ERR_MDB_INVALID_RETURN: u32 = 0x1003;
/// Session class mismatch
pub const ERR_MDB_CLASS_MISMATCH: u32 = 0x1004;
/// Session owner mismatch
pub const ERR_MDB_OWNER_MISMATCH: u32 = 0x1005;
/// Object authentication failed
pub const ERR_MDB_AUTH_FAILED: u32 = 0x1006;
/// Missing required session context
pub const ERR_MDB_MISSING_CONTEXT: u32 = 0x1007;
/// Object key conflict
pub const ERR_MDB_KEY_CONFLICT: u32 = 0x1008;
/// Class needs primary key for new object
pub const ERR_MDB_REQUIRE_KEY: u32 = 0x1009;
/// Missing required object parameter
pub const ERR_MDB_MISSING_REQUIRED: u32 = 0x1010;
/// Object recursion error
pub const ERR_MDB_RECURSION: u32 = 0x1011;

/// Failure in database backend
pub const ERR_DBMANAGER_FAILURE: u32 = 0x2000;
/// Login failed
pub const ERR_DBMANAGER_LOGINFAIL: u32 = 0x2001;
/// Initialization failure
pub const ERR_DBMANAGER_INITFAIL: u32 = 0x2002;
/// Object not found
pub const ERR_DBMANAGER_NOTFOUND: u32 = 0x2003;
/// Permission denied
pub const ERR_DBMANAGER_NOPERM: u32 = 0x2004;
/// Object already exists
pub const ERR_DBMANAGER_EXISTS: u32 = 0x2005;
/// Invalid parameters
pub const ERR_DBMANAGER_INVAL: u32 = 0x2006;
/// Over quota
pub const ERR_DBMANAGER_QUOTA: u32 = 0x2007;

/// Invalid session
pub const ERR_SESSION_INVALID: u32 = 0x3000;
/// Object not found
pub const ERR_SESSION_OBJECT_NOT_FOUND: u32 = 0x3001;
/// Unknown class
pub const ERR_SESSION_CLASS_UNKNOWN: u32 = 0x3002;
/// Error crypting field
pub const ERR_SESSION_CRYPT: u32 = 0x3003;
/// Empty password not allowed for new object
pub const ERR_SESSION_CRYPT_ORIG: u32 = 0x3004;
/// Manual index not allowed for this class
pub const ERR_SESSION_INDEX: u32 = 0x3005;
/// Input validation error
pub const ERR_SESSION_VALIDATION: u32 = 0x3006;
/// No index provided where required
pub const ERR_SESSION_NOINDEX: u32 = 0x3007;
/// Operation not allowed
pub const ERR_SESSION_NOTALLOWED: u32 = 0x3008;

/// Undefined item or error
pub const ERR_RPC_UNDEFINED: u32 = 0x4001;
/// Incomplete request
pub const ERR_RPC_INCOMPLETE: u32 = 0x4002;
/// User entered invalid login
pub const ERR_RPC_INVALIDLOGIN: u32 = 0x4003;
/// Internal server error
pub const ERR_RPC_SERVERINTERNAL: u32 = 0x4004;
/// No current context
pub const ERR_RPC_NOCONTEXT: u32 = 0x4005;
/// Invalid command
pub const ERR_RPC_INVALIDCMD: u32 = 0x4006;
/// Command requires a valid session
pub const ERR_RPC_NOSESSION: u32 = 0x4007;

/// Generic authd failure
pub const ERR_AUTHD_FAILURE: u32 = 0x5000;

/// Generic module failure
pub const ERR_MODULE_FAILURE: u32 = 0x7000;
/// Wrong class for module
pub const ERR_MODULE_WRONGCLASS: u32 = 0x7001;
/// Module refused an update
pub const ERR_MODULE_UPDATE: u32 = 0x7002;
