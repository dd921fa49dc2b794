//! GraphQL documents understood by the Shipkit gateway

// Accounts

pub const REGISTER: &str = r#"
mutation Register($input: CreateAccountInput!) {
  register(input: $input) {
    token
    account { email authorities }
  }
}
"#;

pub const LOGIN: &str = r#"
mutation Login($email: String!, $password: String!) {
  login(email: $email, password: $password) {
    token
    account { email authorities }
  }
}
"#;

pub const CHANGE_PASSWORD: &str = r#"
mutation ChangePassword($input: ChangePasswordInput!) {
  changePassword(input: $input) {
    token
    account { email authorities }
  }
}
"#;

// Deployments

pub const GET_DEPLOYMENTS: &str = r#"
query GetDeployments {
  deployments {
    id
    name
    composeYaml
    createdAt
  }
}
"#;

pub const GET_DEPLOYMENT_STATUS: &str = r#"
query GetDeploymentStatus($id: ID!) {
  deploymentStatus(id: $id) {
    uuid
    state
    message
    status
    containers {
      name
      state
      health
      ports
    }
  }
}
"#;

pub const CREATE_DEPLOYMENT: &str = r#"
mutation CreateDeployment($input: CreateDeploymentInput!) {
  createDeployment(input: $input) {
    id
    name
    composeYaml
    createdAt
  }
}
"#;

pub const UPDATE_DEPLOYMENT: &str = r#"
mutation UpdateDeployment($id: ID!, $input: UpdateDeploymentInput!) {
  updateDeployment(id: $id, input: $input) {
    id
    name
    composeYaml
    createdAt
  }
}
"#;

pub const START_DEPLOYMENT: &str = r#"
mutation StartDeployment($id: ID!) {
  startDeployment(id: $id) {
    id
    name
    composeYaml
    createdAt
  }
}
"#;

pub const STOP_DEPLOYMENT: &str = r#"
mutation StopDeployment($id: ID!) {
  stopDeployment(id: $id)
}
"#;

pub const DELETE_DEPLOYMENT: &str = r#"
mutation DeleteDeployment($id: ID!) {
  deleteDeployment(id: $id)
}
"#;

// Platform

pub const GET_STATUS: &str = r#"
query GetStatus {
  status {
    status
    adminInitialized
    domainInitialized
  }
}
"#;

pub const PLATFORM_SETTINGS: &str = r#"
query PlatformSettings {
  platformSettings {
    fqdn
    sslEnabled
    forceSsl
  }
}
"#;

pub const SETUP_DOMAIN: &str = r#"
mutation SetupDomain($domain: String!, $skipValidation: Boolean, $sslEnabled: Boolean, $forceSsl: Boolean) {
  setupDomain(domain: $domain, skipValidation: $skipValidation, sslEnabled: $sslEnabled, forceSsl: $forceSsl)
}
"#;

/// Extract the operation name (`query Foo` / `mutation Foo`) from a document
pub fn operation_name(document: &str) -> Option<&str> {
    let mut words = document.split_whitespace();
    while let Some(word) = words.next() {
        if word == "query" || word == "mutation" {
            return words
                .next()
                .map(|name| name.split(['(', '{']).next().unwrap_or(name))
                .filter(|name| !name.is_empty());
        }
    }
    None
}
