use notebook_types::User;

pub fn format_user(user: &User) -> String {
    format!(
        "{:>4}  {}  {}",
        user.id,
        display_or_dash(&user.full_name()),
        display_or_dash(&user.phone)
    )
}

pub fn format_users(users: &[User]) -> String {
    if users.is_empty() {
        return "No users.".to_string();
    }

    let name_width = users
        .iter()
        .map(|u| u.full_name().chars().count().max(1))
        .max()
        .unwrap_or(1);

    users
        .iter()
        .map(|u| {
            format!(
                "{:>4}  {:<width$}  {}",
                u.id,
                display_or_dash(&u.full_name()),
                display_or_dash(&u.phone),
                width = name_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_created(user: &User) -> String {
    format!("Created user {}: {}", user.id, user)
}

pub fn format_updated(id: u64, patch: Option<&User>) -> String {
    match patch {
        Some(patch) => {
            let changed: Vec<String> = [
                ("first name", &patch.first_name),
                ("last name", &patch.last_name),
                ("phone", &patch.phone),
            ]
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(field, value)| format!("{} = {}", field, value))
            .collect();

            if changed.is_empty() {
                format!("User {} unchanged", id)
            } else {
                format!("Updated user {}: {}", id, changed.join(", "))
            }
        }
        None => format!("No user with id {}", id),
    }
}

pub fn format_deleted(id: u64, deleted: bool) -> String {
    if deleted {
        format!("Deleted user {}", id)
    } else {
        format!("No user with id {}", id)
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
