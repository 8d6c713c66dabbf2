use super::{Field, FieldKind, Format, Schema};

const fn string(min_len: usize, max_len: Option<usize>) -> FieldKind {
    FieldKind::String {
        min_len,
        max_len,
        format: None,
    }
}

const fn required(name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        required: true,
        nullable: false,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        required: false,
        nullable: false,
    }
}

const fn nullable(name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        required: false,
        nullable: true,
    }
}

const NON_NEGATIVE: FieldKind = FieldKind::Integer { min: Some(0) };
const URI: FieldKind = FieldKind::String {
    min_len: 1,
    max_len: None,
    format: Some(Format::Uri),
};
const EMAIL: FieldKind = FieldKind::String {
    min_len: 6,
    max_len: Some(60),
    format: Some(Format::Email),
};
const NAME: FieldKind = string(1, Some(30));
const PASSWORD: FieldKind = string(5, Some(20));

pub const COMPANY_NEW: Schema = Schema {
    name: "companyNew",
    fields: &[
        required("handle", string(1, Some(25))),
        required("name", string(1, None)),
        required("description", string(0, None)),
        required("numEmployees", NON_NEGATIVE),
        nullable("logoUrl", URI),
    ],
};

pub const COMPANY_UPDATE: Schema = Schema {
    name: "companyUpdate",
    fields: &[
        optional("name", string(1, None)),
        optional("description", string(0, None)),
        optional("numEmployees", NON_NEGATIVE),
        nullable("logoUrl", URI),
    ],
};

pub const JOB_NEW: Schema = Schema {
    name: "jobNew",
    fields: &[
        required("title", string(1, None)),
        nullable("salary", NON_NEGATIVE),
        nullable("equity", FieldKind::Equity),
        required("companyHandle", string(1, Some(25))),
    ],
};

pub const JOB_UPDATE: Schema = Schema {
    name: "jobUpdate",
    fields: &[
        optional("title", string(1, None)),
        nullable("salary", NON_NEGATIVE),
        nullable("equity", FieldKind::Equity),
    ],
};

pub const USER_NEW: Schema = Schema {
    name: "userNew",
    fields: &[
        required("username", NAME),
        required("password", PASSWORD),
        required("firstName", NAME),
        required("lastName", NAME),
        required("email", EMAIL),
        optional("isAdmin", FieldKind::Boolean),
    ],
};

pub const USER_REGISTER: Schema = Schema {
    name: "userRegister",
    fields: &[
        required("username", NAME),
        required("password", PASSWORD),
        required("firstName", NAME),
        required("lastName", NAME),
        required("email", EMAIL),
    ],
};

pub const USER_UPDATE: Schema = Schema {
    name: "userUpdate",
    fields: &[
        optional("firstName", NAME),
        optional("lastName", NAME),
        optional("password", PASSWORD),
        optional("email", EMAIL),
    ],
};

pub const USER_AUTH: Schema = Schema {
    name: "userAuth",
    fields: &[
        required("username", string(1, None)),
        required("password", string(1, None)),
    ],
};
