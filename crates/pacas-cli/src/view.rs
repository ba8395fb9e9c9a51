//! `view` command handler: the contact gate in front of a listing link.

use pacas_client::{ContactDetails, GateDecision, LeadGate, StateStore};
use pacas_core::Listing;

/// Print the listing URL, capturing contact details first if none are on file.
///
/// # Errors
///
/// Returns an error if no email is on file and none was given, if the
/// contact details fail validation, or if local state cannot be saved.
pub(crate) fn run_view<S: StateStore>(
    gate: &mut LeadGate<S>,
    listing: &Listing,
    contact: Option<&ContactDetails>,
) -> anyhow::Result<()> {
    let url = match gate.view_details(listing)? {
        GateDecision::Redirect(url) => url,
        GateDecision::PromptForContact => {
            let Some(contact) = contact else {
                anyhow::bail!(
                    "please enter your email to view this property: re-run with --email \
                     (optionally --phone, --name, --callback)"
                );
            };
            gate.submit_contact(listing, contact)?
        }
    };
    println!("{url}");
    Ok(())
}
