use momentz_shared::validation;

use crate::coordinator::{message_or, Coordinator, Snapshot};
use crate::events::{Mutation, MutationKind, Outcome, ProfileForm, Target};
use crate::notify::notice;

impl Coordinator {
    /// Save the edit-profile form.
    ///
    /// The entered values are shown at once; the server's copy replaces
    /// them when it answers.
    pub(crate) async fn update_profile(&self, form: ProfileForm) -> Outcome {
        let picture = match &form.upload {
            Some(image) => Some(image.to_data_uri()),
            None => Some(form.picture_url.clone()),
        };
        let request = match validation::profile_update(
            &form.full_name,
            &form.bio,
            &form.website,
            picture.as_deref(),
        ) {
            Ok(req) => req,
            Err(e) => return Outcome::Invalid(e),
        };

        let mutation = Mutation::new(MutationKind::UpdateProfile, Target::Me);
        let _claim = self.inflight().claim(mutation).await;

        let pending = self.begin(mutation, true, |state| {
            let before = state.profile.clone();
            if let Some(profile) = state.profile.as_mut() {
                profile.full_name = request.full_name.clone();
                profile.bio = request.bio.clone();
                profile.website = request.website.clone();
                if let Some(picture) = &request.profile_picture {
                    profile.profile_picture = Some(picture.clone());
                }
            }
            Snapshot::Profile(before)
        });

        let result = self.api().update_profile(&request).await;

        self.settle(
            pending,
            result,
            |err| message_or(err, notice::PROFILE_FAILED),
            |state, user| {
                state.profile = Some(user);
                state.toasts.success(notice::PROFILE_UPDATED);
                Outcome::Confirmed
            },
        )
    }
}
